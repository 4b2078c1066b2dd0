use std::net::SocketAddr;
use std::sync::Arc;

use common::analysis::BinaryClassifier;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(
        allowed_types = ?config.upload.allowed_types,
        max_bytes = config.upload.max_bytes,
        "Upload policy loaded"
    );

    let db = init_db(&config.database).await?;
    info!(url = %config.database.url, "Database ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState {
        db,
        config,
        classifier: Arc::new(BinaryClassifier::new()),
    };

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
