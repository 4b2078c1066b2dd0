use common::dashboard::{CategoryFilter, DashboardQuery};
use serde::Deserialize;

use crate::error::AppError;

/// Query parameters for listing analyses.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct AnalysisListQuery {
    /// Result category: `all` (default), `benign` or `malignant`.
    #[param(example = "benign")]
    pub filter: Option<String>,
    /// Case-insensitive substring of the analysis ID.
    #[param(example = "0193")]
    pub search: Option<String>,
}

impl AnalysisListQuery {
    pub fn is_unfiltered(&self) -> bool {
        self.filter.is_none() && self.search.as_deref().is_none_or(|s| s.trim().is_empty())
    }

    pub fn to_dashboard_query(&self) -> Result<DashboardQuery, AppError> {
        let category = match self.filter.as_deref() {
            Some(raw) => raw.parse::<CategoryFilter>().map_err(AppError::Validation)?,
            None => CategoryFilter::All,
        };
        Ok(DashboardQuery::new(
            category,
            self.search.clone().unwrap_or_default(),
        ))
    }
}
