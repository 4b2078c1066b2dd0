use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisFailure, AnalysisResult, ImagePayload};

/// Identifier of an uploaded item, assigned at intake (UUIDv7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle status of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Accepted, not yet submitted.
    Idle,
    /// Submitted; waiting for the classifier to settle.
    Analyzing,
    /// Classifier returned a result.
    Complete,
    /// Classifier call failed.
    Error,
}

impl ItemStatus {
    /// Returns true for `complete` and `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    pub const ALL: &'static [ItemStatus] =
        &[Self::Idle, Self::Analyzing, Self::Complete, Self::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            ItemStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ItemStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "analyzing" => Ok(Self::Analyzing),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Sequence number of a submission of one item.
pub type Attempt = u32;

/// Status plus the data that only exists in that status.
///
/// A result lives inside `Complete`, so no other state can carry one.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemState {
    Idle,
    Analyzing { attempt: Attempt },
    Complete(AnalysisResult),
    Error(AnalysisFailure),
}

impl ItemState {
    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Idle => ItemStatus::Idle,
            Self::Analyzing { .. } => ItemStatus::Analyzing,
            Self::Complete(_) => ItemStatus::Complete,
            Self::Error(_) => ItemStatus::Error,
        }
    }
}

/// Renderable `data:` URI built once from the source bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview(Arc<str>);

impl Preview {
    pub fn from_bytes(content_type: &str, bytes: &[u8]) -> Self {
        let uri = format!("data:{content_type};base64,{}", STANDARD.encode(bytes));
        Self(Arc::from(uri))
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }
}

/// One user-submitted image tracked through validation, analysis and display.
#[derive(Clone, Debug)]
pub struct UploadItem {
    id: ItemId,
    name: String,
    content_type: String,
    source: Arc<[u8]>,
    preview: Preview,
    pub(crate) state: ItemState,
    pub(crate) attempts: Attempt,
    added_at: DateTime<Utc>,
}

impl UploadItem {
    /// New `idle` item with a fresh id; the preview is derived here and never changes.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = content_type.into();
        let preview = Preview::from_bytes(&content_type, &bytes);
        Self {
            id: ItemId::new(),
            name: name.into(),
            content_type,
            source: Arc::from(bytes),
            preview,
            state: ItemState::Idle,
            attempts: 0,
            added_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.source.len() as u64
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn status(&self) -> ItemStatus {
        self.state.status()
    }

    /// Present iff the status is `complete`.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            ItemState::Complete(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match &self.state {
            ItemState::Error(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn attempts(&self) -> Attempt {
        self.attempts
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Payload for the classifier; shares the source bytes.
    pub fn payload(&self) -> ImagePayload {
        ImagePayload {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            bytes: Arc::clone(&self.source),
        }
    }
}
