use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AnalysisClient, AnalysisError, AnalysisResult, ImagePayload};
use crate::record::{AnalyzeResponse, StoredAnalysisRecord};

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for the persistence service's HTTP API.
#[derive(Clone)]
pub struct RemoteAnalysisClient {
    http: Client,
    base_url: String,
}

impl RemoteAnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Fetch all stored analyses, newest first.
    pub async fn list_records(&self) -> Result<Vec<StoredAnalysisRecord>, AnalysisError> {
        let res = self
            .http
            .get(self.url("/analyses"))
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;
        let res = check_status(res).await?;
        res.json()
            .await
            .map_err(|e| AnalysisError::Server(format!("malformed record list: {e}")))
    }
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, AnalysisError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    warn!(%status, error = %message, "Analysis service returned an error");

    if status == StatusCode::BAD_REQUEST {
        Err(AnalysisError::InvalidInput(message))
    } else {
        Err(AnalysisError::Server(message))
    }
}

#[async_trait]
impl AnalysisClient for RemoteAnalysisClient {
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;
        let form = Form::new().part("image", part);

        debug!(image = %image.name, "Submitting image for analysis");
        let res = self
            .http
            .post(self.url("/analyze"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;
        let res = check_status(res).await?;

        let body: AnalyzeResponse = res
            .json()
            .await
            .map_err(|e| AnalysisError::Server(format!("malformed analysis response: {e}")))?;
        Ok(body.into_result())
    }
}
