use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{AnalysisClient, AnalysisError, AnalysisResult, ImagePayload};

const BENIGN_FEATURES: [&str; 3] = ["Regular borders", "Symmetrical", "Uniform color"];
const MALIGNANT_FEATURES: [&str; 3] = ["Irregular borders", "Asymmetry", "Multiple colors"];

pub const BENIGN_RECOMMENDATION: &str =
    "Monitor for changes and consult a dermatologist if concerned";
pub const MALIGNANT_RECOMMENDATION: &str = "Consult a dermatologist as soon as possible";

/// Placeholder benign/malignant classifier used by the persistence service.
///
/// Responds immediately with confidence in [0.70, 0.95).
pub struct BinaryClassifier {
    rng: Mutex<StdRng>,
}

impl BinaryClassifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for BinaryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisClient for BinaryClassifier {
    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        if image.bytes.is_empty() {
            return Err(AnalysisError::InvalidInput("image is empty".into()));
        }

        let (malignant, confidence) = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| AnalysisError::Server("classifier state poisoned".into()))?;
            (rng.random_bool(0.5), 0.7 + rng.random::<f64>() * 0.25)
        };

        let result = if malignant {
            AnalysisResult::new("malignant", confidence)
                .with_features(MALIGNANT_FEATURES)
                .with_recommendations([MALIGNANT_RECOMMENDATION])
        } else {
            AnalysisResult::new("benign", confidence)
                .with_features(BENIGN_FEATURES)
                .with_recommendations([BENIGN_RECOMMENDATION])
        };

        debug!(image = %image.name, label = %result.label, confidence, "Classified image");
        Ok(result)
    }
}
