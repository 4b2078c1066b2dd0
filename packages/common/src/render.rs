use std::fmt;

use crate::analysis::{AnalysisResult, ResultCategory};
use crate::item::{ItemStatus, UploadItem};

pub const DISCLAIMER: &str = "Note: This analysis is for informational purposes only \
    and should not replace professional medical advice.";

/// How much weight a confidence score deserves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    /// >= 0.8
    High,
    /// >= 0.5
    Moderate,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

/// Presentation-ready view of a completed analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultSummary {
    pub label: String,
    pub category: ResultCategory,
    pub confidence_percent: u8,
    pub band: ConfidenceBand,
    pub recommendations: Vec<String>,
    pub features: Vec<String>,
    pub region_count: usize,
}

impl ResultSummary {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let label = match result.label.trim() {
            "" => "Unknown".to_string(),
            label => label.to_string(),
        };
        let percent = (result.confidence.clamp(0.0, 1.0) * 100.0).round() as u8;

        Self {
            label,
            category: result.category(),
            confidence_percent: percent,
            band: ConfidenceBand::from_confidence(result.confidence),
            recommendations: result.recommendations.clone().unwrap_or_default(),
            features: result.features.clone().unwrap_or_default(),
            region_count: result.regions.as_ref().map_or(0, Vec::len),
        }
    }

    /// Confidence badge text, e.g. `"82%"`.
    pub fn badge(&self) -> String {
        format!("{}%", self.confidence_percent)
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Diagnosis:  {}", self.label)?;
        writeln!(f, "Confidence: {} ({})", self.badge(), self.band.as_str())?;
        if !self.features.is_empty() {
            writeln!(f, "Features:   {}", self.features.join(", "))?;
        }
        if self.region_count > 0 {
            writeln!(f, "Regions:    {}", self.region_count)?;
        }
        if !self.recommendations.is_empty() {
            writeln!(f, "Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "  - {rec}")?;
            }
        }
        write!(f, "{DISCLAIMER}")
    }
}

/// What to show for one item in its current state.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemView {
    Idle,
    Analyzing,
    Complete(ResultSummary),
    Failed { message: &'static str },
}

impl ItemView {
    pub fn from_item(item: &UploadItem) -> Self {
        match (item.status(), item.result(), item.failure()) {
            (ItemStatus::Complete, Some(result), _) => {
                Self::Complete(ResultSummary::from_result(result))
            }
            (ItemStatus::Error, _, Some(failure)) => Self::Failed {
                message: failure.user_message(),
            },
            (ItemStatus::Analyzing, _, _) => Self::Analyzing,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Ready to analyze"),
            Self::Analyzing => f.write_str("Analyzing..."),
            Self::Complete(summary) => fmt::Display::fmt(summary, f),
            Self::Failed { message } => write!(f, "Analysis failed. {message}"),
        }
    }
}
