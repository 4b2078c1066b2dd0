use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AnalysisResult;

/// Raw image handed to an analysis backend.
#[derive(Clone, Debug)]
pub struct ImagePayload {
    pub name: String,
    pub content_type: String,
    pub bytes: Arc<[u8]>,
}

/// Classified failure of a single analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("server failure: {0}")]
    Server(String),
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::Server(_) => FailureKind::Server,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Network,
    InvalidInput,
    Server,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::InvalidInput => "invalid-input",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an item in the `error` state remembers about its failure.
///
/// Only the kind is kept; error detail goes to the log, never to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub kind: FailureKind,
}

impl AnalysisFailure {
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            FailureKind::Network => "Could not reach the analysis service. Please try again.",
            FailureKind::InvalidInput => "This image could not be analyzed.",
            FailureKind::Server => "An error occurred while analyzing the image. Please try again.",
        }
    }
}

impl From<&AnalysisError> for AnalysisFailure {
    fn from(err: &AnalysisError) -> Self {
        Self { kind: err.kind() }
    }
}

/// Boundary to an image classifier.
///
/// Calls are single-shot: implementations must not retry on their own, and
/// callers get no ordering guarantee between concurrent calls.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError>;
}

#[async_trait]
impl<T: AnalysisClient + ?Sized> AnalysisClient for Arc<T> {
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        (**self).analyze(image).await
    }
}
