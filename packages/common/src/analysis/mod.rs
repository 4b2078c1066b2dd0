mod binary;
mod client;
mod mock;
#[cfg(feature = "remote")]
mod remote;

pub use binary::BinaryClassifier;
pub use client::{AnalysisClient, AnalysisError, AnalysisFailure, FailureKind, ImagePayload};
pub use mock::{CONDITIONS, Condition, MockClassifier};
#[cfg(feature = "remote")]
pub use remote::RemoteAnalysisClient;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification produced by an analysis backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnalysisResult {
    /// Diagnosis or class label, e.g. `benign` or `Melanocytic Nevus`.
    #[schema(example = "benign")]
    pub label: String,
    /// Confidence in [0.0, 1.0].
    #[schema(example = 0.82)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<Region>>,
    /// Observed lesion characteristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Annotated area of the image; coordinates are normalized to [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub confidence: f64,
}

fn unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl AnalysisResult {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            recommendations: None,
            regions: None,
            features: None,
        }
    }

    pub fn with_recommendations<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommendations = Some(items.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_features<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Some(items.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = Some(regions);
        self
    }

    pub fn category(&self) -> ResultCategory {
        ResultCategory::from_label(&self.label)
    }

    /// Reject payloads whose numbers fall outside their normalized ranges.
    pub fn check(&self) -> Result<(), String> {
        if !unit_interval(self.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.confidence));
        }
        for region in self.regions.iter().flatten() {
            let coords = [region.x, region.y, region.width, region.height];
            if !coords.into_iter().all(unit_interval) || !unit_interval(region.confidence) {
                return Err(format!("region '{}' is not normalized", region.label));
            }
        }
        Ok(())
    }
}

/// Coarse dashboard category derived from a result label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultCategory {
    Benign,
    Malignant,
    /// Any label outside the binary taxonomy.
    Other,
}

impl ResultCategory {
    /// Case-insensitive exact match on `benign` / `malignant`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("benign") {
            Self::Benign
        } else if label.eq_ignore_ascii_case("malignant") {
            Self::Malignant
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Benign => "benign",
            Self::Malignant => "malignant",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "benign" => Ok(Self::Benign),
            "malignant" => Ok(Self::Malignant),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown result category '{s}'")),
        }
    }
}
