use std::sync::Arc;

use common::AnalysisClient;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub classifier: Arc<dyn AnalysisClient>,
}
