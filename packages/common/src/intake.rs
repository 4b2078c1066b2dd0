use std::path::Path;

use tracing::{debug, warn};

use crate::item::UploadItem;
use crate::validator::{UploadPolicy, ValidationError, normalize_mime};

/// A file offered for upload, before validation.
#[derive(Clone, Debug)]
pub struct CandidateFile {
    pub name: String,
    /// MIME type declared by the source (browser, multipart part, ...).
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, declared_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            bytes,
        }
    }

    /// Read a file from disk; the type is guessed from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, None, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared type, or a guess from the file name when none was declared.
    pub fn effective_type(&self) -> Option<String> {
        match self.declared_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => Some(normalize_mime(declared)),
            _ => mime_guess::from_path(&self.name)
                .first()
                .map(|m| normalize_mime(m.essence_str())),
        }
    }
}

/// A file that was refused at intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub error: ValidationError,
}

/// Outcome of one intake call.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub accepted: Vec<UploadItem>,
    pub rejected: Vec<Rejection>,
}

/// Validate each file and turn the accepted ones into `idle` items.
///
/// A rejected file does not stop the others.
pub fn intake(
    policy: &UploadPolicy,
    files: impl IntoIterator<Item = CandidateFile>,
) -> IntakeReport {
    let mut report = IntakeReport::default();

    for file in files {
        match policy.validate(&file) {
            Ok(()) => {
                let content_type = file
                    .effective_type()
                    .unwrap_or_else(|| "application/octet-stream".into());
                let item = UploadItem::new(file.name, content_type, file.bytes);
                debug!(id = %item.id(), name = %item.name(), "File accepted");
                report.accepted.push(item);
            }
            Err(error) => {
                warn!(name = %file.name, reason = error.reason(), "File rejected");
                report.rejected.push(Rejection {
                    name: file.name,
                    error,
                });
            }
        }
    }

    report
}
