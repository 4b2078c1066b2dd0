use serde::Deserialize;

use crate::validator::UploadPolicy;

/// Settings for an analysis session.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub upload: UploadPolicy,
    /// Whether `complete`/`error` items may be analyzed again. Default: true.
    #[serde(default = "default_allow_resubmit")]
    pub allow_resubmit: bool,
}

fn default_allow_resubmit() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            upload: UploadPolicy::default(),
            allow_resubmit: default_allow_resubmit(),
        }
    }
}
