use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(analyze_routes(config))
        .routes(routes!(handlers::analysis::list_analyses))
}

fn analyze_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::analysis::analyze_image))
        .layer(handlers::analysis::analyze_body_limit(
            config.upload_body_limit(),
        ))
}
