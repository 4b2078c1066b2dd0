use serde::Deserialize;
use thiserror::Error;

use crate::intake::CandidateFile;

/// Upload acceptance policy: which MIME types are allowed and how large a file may be.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Accepted MIME types. Default: `image/jpeg`, `image/png`.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
    /// Maximum file size in bytes. Default: 5 MiB.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_allowed_types() -> Vec<String> {
    vec!["image/jpeg".into(), "image/png".into()]
}
fn default_max_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_types: default_allowed_types(),
            max_bytes: default_max_bytes(),
        }
    }
}

/// Why a candidate file was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid file type '{declared}'. Accepted types: {accepted}")]
    InvalidType { declared: String, accepted: String },
    #[error("File too large ({}). Maximum size is {}", human_size(.size), human_size(.limit))]
    TooLarge { size: u64, limit: u64 },
}

impl ValidationError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidType { .. } => "invalid-type",
            Self::TooLarge { .. } => "too-large",
        }
    }
}

impl UploadPolicy {
    /// Policy with `image/webp` added to the default types.
    pub fn with_webp(mut self) -> Self {
        if !self.allows("image/webp") {
            self.allowed_types.push("image/webp".into());
        }
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Whether `content_type` is in the allow-set after normalization.
    pub fn allows(&self, content_type: &str) -> bool {
        let wanted = normalize_mime(content_type);
        self.allowed_types
            .iter()
            .any(|allowed| normalize_mime(allowed) == wanted)
    }

    /// Decide whether `file` may enter the item store. Type is checked before size.
    pub fn validate(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        let declared = file.effective_type();
        match declared.as_deref() {
            Some(mime) if self.allows(mime) => {}
            other => {
                return Err(ValidationError::InvalidType {
                    declared: other.unwrap_or("unknown").to_string(),
                    accepted: self.allowed_types.join(", "),
                });
            }
        }

        let size = file.size();
        if size > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Lowercase, strip parameters, and fold `image/jpg` into `image/jpeg`.
pub fn normalize_mime(raw: &str) -> String {
    let essence = raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => essence,
    }
}

fn human_size(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// Human-readable byte count using 1024 steps, e.g. `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
