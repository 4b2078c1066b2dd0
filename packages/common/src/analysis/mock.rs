use std::ops::Range;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{AnalysisClient, AnalysisError, AnalysisResult, ImagePayload, Region};

/// A simulated skin condition with its confidence range and advice.
#[derive(Debug)]
pub struct Condition {
    pub name: &'static str,
    /// Lowest confidence reported for this condition.
    pub min_confidence: f64,
    /// Width of the confidence range above `min_confidence`.
    pub spread: f64,
    pub recommendations: &'static [&'static str],
}

pub const CONDITIONS: &[Condition] = &[
    Condition {
        name: "Actinic Keratosis",
        min_confidence: 0.70,
        spread: 0.20,
        recommendations: &[
            "Regular skin examinations",
            "Sun protection with SPF 50+",
            "Consider consultation with a dermatologist",
        ],
    },
    Condition {
        name: "Basal Cell Carcinoma",
        min_confidence: 0.60,
        spread: 0.30,
        recommendations: &[
            "Prompt medical evaluation recommended",
            "Avoid sun exposure without protection",
            "Schedule a follow-up with a dermatologist",
        ],
    },
    Condition {
        name: "Melanocytic Nevus",
        min_confidence: 0.75,
        spread: 0.20,
        recommendations: &[
            "Annual skin check recommended",
            "Monitor for any changes in size, shape, or color",
            "Use sun protection consistently",
        ],
    },
    Condition {
        name: "Dermatofibroma",
        min_confidence: 0.65,
        spread: 0.20,
        recommendations: &[
            "Usually benign and doesn't require treatment",
            "Document any changes with photographs",
            "See a dermatologist if growth is rapid",
        ],
    },
    Condition {
        name: "Vascular Lesion",
        min_confidence: 0.60,
        spread: 0.25,
        recommendations: &[
            "Consult with a specialist for proper classification",
            "Avoid irritating the area",
            "Consider imaging studies for deeper assessment",
        ],
    },
];

/// Placeholder classifier that picks a random condition after a simulated delay.
pub struct MockClassifier {
    rng: Mutex<StdRng>,
    delay: Range<Duration>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            delay: Duration::from_millis(1500)..Duration::from_millis(3000),
        }
    }

    /// Reproducible sequence of results.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::new()
        }
    }

    /// Simulated latency range. An empty range means a fixed delay of `delay.start`.
    pub fn with_delay(mut self, delay: Range<Duration>) -> Self {
        self.delay = delay;
        self
    }

    fn draw(&self) -> Result<(AnalysisResult, Duration), AnalysisError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AnalysisError::Server("classifier state poisoned".into()))?;

        let condition = &CONDITIONS[rng.random_range(0..CONDITIONS.len())];
        let confidence = condition.min_confidence + rng.random::<f64>() * condition.spread;
        let region = Region {
            x: rng.random::<f64>() * 0.7,
            y: rng.random::<f64>() * 0.7,
            width: 0.1 + rng.random::<f64>() * 0.2,
            height: 0.1 + rng.random::<f64>() * 0.2,
            label: condition.name.to_string(),
            confidence,
        };

        let delay = if self.delay.is_empty() {
            self.delay.start
        } else {
            rng.random_range(self.delay.clone())
        };

        let result = AnalysisResult::new(condition.name, confidence)
            .with_recommendations(condition.recommendations.iter().copied())
            .with_regions(vec![region]);
        Ok((result, delay))
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisClient for MockClassifier {
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let (result, delay) = self.draw()?;
        debug!(
            image = %image.name,
            label = %result.label,
            delay_ms = delay.as_millis() as u64,
            "Simulating analysis"
        );
        tokio::time::sleep(delay).await;
        Ok(result)
    }
}
