use common::record::StoredAnalysisRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One persisted analysis. Rows are only ever inserted.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analysis")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Submitted image as a `data:` URI.
    #[sea_orm(column_type = "Text")]
    pub original_image: String,

    /// Result label (`benign` / `malignant`).
    pub result: String,

    pub confidence: f64,

    /// `{features, recommendation}` object.
    #[sea_orm(column_type = "Json")]
    pub additional_info: serde_json::Value,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoredAnalysisRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            original_image: model.original_image,
            result: model.result,
            confidence: model.confidence,
            additional_info: model.additional_info,
            created_at: model.created_at,
        }
    }
}
