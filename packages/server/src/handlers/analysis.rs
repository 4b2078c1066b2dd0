use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::analysis::ImagePayload;
use common::dashboard::{self, DashboardView};
use common::intake::CandidateFile;
use common::item::Preview;
use common::record::{AdditionalInfo, AnalyzeResponse, StoredAnalysisRecord};
use common::validator::format_file_size;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entity::analysis;
use crate::error::{AppError, ErrorBody};
use crate::models::analysis::AnalysisListQuery;
use crate::state::AppState;

pub fn analyze_body_limit(limit: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(limit)
}

fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation(format!(
            "File too large. Maximum size is {}",
            format_file_size(max_bytes)
        ))
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

#[utoipa::path(
    post,
    path = "/analyze",
    tag = "Analyses",
    operation_id = "analyzeImage",
    summary = "Analyze a lesion image",
    description = "Validates the uploaded `image` multipart field against the configured type and \
        size policy, classifies it, and appends the outcome to the analysis history.",
    request_body(
        content_type = "multipart/form-data",
        description = "Image upload in the `image` field"
    ),
    responses(
        (status = 200, description = "Analysis result", body = AnalyzeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Processing failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let max_bytes = state.config.upload.max_bytes;
    let mut candidate: Option<CandidateFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() == Some("image") {
            let name = field.file_name().unwrap_or("upload").to_string();
            let declared = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_bytes))?;
            candidate = Some(CandidateFile::new(name, declared, data.to_vec()));
            break;
        }
    }

    let file = candidate.ok_or_else(|| AppError::Validation("No image provided".into()))?;
    state.config.upload.validate(&file)?;

    let content_type = file
        .effective_type()
        .ok_or_else(|| AppError::Validation("Unknown image type".into()))?;
    let bytes: Arc<[u8]> = Arc::from(file.bytes);
    let size = bytes.len();

    let result = state
        .classifier
        .analyze(ImagePayload {
            name: file.name.clone(),
            content_type: content_type.clone(),
            bytes: Arc::clone(&bytes),
        })
        .await?;
    result
        .check()
        .map_err(|reason| AppError::Internal(format!("classifier returned {reason}")))?;

    let additional_info = AdditionalInfo::from_result(&result);
    let record = analysis::ActiveModel {
        id: Set(Uuid::now_v7()),
        original_image: Set(Preview::from_bytes(&content_type, &bytes)
            .as_data_uri()
            .to_string()),
        result: Set(result.label.clone()),
        confidence: Set(result.confidence),
        additional_info: Set(serde_json::to_value(&additional_info)
            .map_err(|e| AppError::Internal(e.to_string()))?),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(
        id = %record.id,
        file = %file.name,
        size,
        result = %record.result,
        confidence = record.confidence,
        "Stored analysis"
    );

    Ok(Json(AnalyzeResponse {
        id: record.id,
        result: record.result,
        confidence: record.confidence,
        additional_info,
    }))
}

#[utoipa::path(
    get,
    path = "/analyses",
    tag = "Analyses",
    operation_id = "listAnalyses",
    summary = "List stored analyses",
    description = "Returns stored analyses, newest first. Optional `filter` and `search` narrow \
        the list the same way the dashboard does.",
    params(AnalysisListQuery),
    responses(
        (status = 200, description = "Stored analyses", body = [StoredAnalysisRecord]),
        (status = 400, description = "Invalid filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Database failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_analyses(
    State(state): State<AppState>,
    Query(query): Query<AnalysisListQuery>,
) -> Result<Json<Vec<StoredAnalysisRecord>>, AppError> {
    let dashboard_query = query.to_dashboard_query()?;

    let records: Vec<StoredAnalysisRecord> = analysis::Entity::find()
        .order_by_desc(analysis::Column::CreatedAt)
        .order_by_desc(analysis::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    if query.is_unfiltered() {
        return Ok(Json(records));
    }

    let matched = match dashboard::filter(&records, &dashboard_query) {
        DashboardView::Matches(entries) => entries.into_iter().cloned().collect(),
        DashboardView::NoEntries | DashboardView::NoMatches { .. } => Vec::new(),
    };
    Ok(Json(matched))
}
