//! Wire types of the persistence service, shared by the server and its client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisResult, ResultCategory};

/// Extra payload stored alongside each persisted analysis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdditionalInfo {
    #[serde(default)]
    pub features: Vec<String>,
    /// Single recommendation shown with the result.
    #[serde(default)]
    pub recommendation: String,
}

impl AdditionalInfo {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            features: result.features.clone().unwrap_or_default(),
            recommendation: result
                .recommendations
                .as_ref()
                .and_then(|r| r.first().cloned())
                .unwrap_or_default(),
        }
    }
}

/// Append-only record of one persisted analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysisRecord {
    pub id: Uuid,
    /// Submitted image as a `data:` URI.
    pub original_image: String,
    /// Result label.
    #[schema(example = "benign")]
    pub result: String,
    #[schema(example = 0.87)]
    pub confidence: f64,
    pub additional_info: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl StoredAnalysisRecord {
    pub fn category(&self) -> ResultCategory {
        ResultCategory::from_label(&self.result)
    }
}

/// Response of `POST /api/v1/analyze`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub id: Uuid,
    #[schema(example = "malignant")]
    pub result: String,
    #[schema(example = 0.91)]
    pub confidence: f64,
    pub additional_info: AdditionalInfo,
}

impl AnalyzeResponse {
    /// Rebuild the canonical result from the wire shape.
    pub fn into_result(self) -> AnalysisResult {
        let mut result = AnalysisResult::new(self.result, self.confidence);
        if !self.additional_info.features.is_empty() {
            result = result.with_features(self.additional_info.features);
        }
        if !self.additional_info.recommendation.is_empty() {
            result = result.with_recommendations([self.additional_info.recommendation]);
        }
        result
    }
}
