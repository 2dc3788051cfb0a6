//! Offline result synthesis for demo mode.
//!
//! Only used when the backend cannot be reached at all. The shape is fixed;
//! the token and score come from a random source that callers may inject.

use std::ops::Range;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use trackscan_core::{Detection, SubmissionResult, TargetMatch};

/// Tracking-number-shaped tokens: `<digits>_<digit>_<three letters>`.
pub const PATTERN_CANDIDATES: [&str; 3] = [
    "163233702292313922_1_lWV",
    "163233702292313923_1_xYz",
    "163233702292313924_1_aBc",
];

/// Score range of a simulated match (percent, end exclusive).
pub const SCORE_RANGE: Range<f64> = 75.0..95.0;

/// Pipeline reported by every simulated result.
pub const PREPROCESSING_STEPS: [&str; 5] = [
    "grayscale",
    "denoise",
    "contrast_enhance",
    "deskew",
    "adaptive_threshold",
];

/// Number of detections in every simulated result.
pub const DETECTION_COUNT: usize = 8;

/// Simulate a result with the RNG seeded from `seed_name`.
///
/// The same name always yields the same result.
pub fn simulate(seed_name: &str) -> SubmissionResult {
    let mut rng = StdRng::seed_from_u64(seed_from_name(seed_name));
    simulate_with(seed_name, &mut rng)
}

/// Simulate a result drawing from the given random source.
pub fn simulate_with<R: Rng + ?Sized>(seed_name: &str, rng: &mut R) -> SubmissionResult {
    let pattern = PATTERN_CANDIDATES[rng.gen_range(0..PATTERN_CANDIDATES.len())];
    let score = rng.gen_range(SCORE_RANGE);
    debug!(seed = %seed_name, pattern = %pattern, score, "Simulating OCR result");

    SubmissionResult {
        success: true,
        target_match: Some(TargetMatch {
            matched_text: format!("TRACKING: {pattern} SHIP TO: 123 Main St"),
            score,
            pattern_found: pattern.to_string(),
        }),
        detections: vec![
            Detection::new("SHIPPING", 0.95, "tesseract"),
            Detection::new("LABEL", 0.92, "tesseract"),
            Detection::new(pattern, score / 100.0, "easyocr"),
            Detection::new("SHIP", 0.88, "paddleocr"),
            Detection::new("TO:", 0.91, "paddleocr"),
            Detection::new("123", 0.85, "tesseract"),
            Detection::new("Main", 0.87, "easyocr"),
            Detection::new("St", 0.89, "easyocr"),
        ],
        full_text: format!(
            "SHIPPING LABEL\nTRACKING: {pattern}\nSHIP TO: 123 Main St\nCity, State 12345"
        ),
        preprocessing_steps: PREPROCESSING_STEPS.iter().map(|s| s.to_string()).collect(),
        error: None,
    }
}

// FNV-1a; stable across releases, unlike `DefaultHasher`.
fn seed_from_name(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Simulator owned by a controller.
///
/// Without an injected RNG each result is seeded from its name.
#[derive(Debug, Default)]
pub struct ResultSimulator {
    rng: Option<Mutex<StdRng>>,
}

impl ResultSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Some(Mutex::new(rng)),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn generate(&self, seed_name: &str) -> SubmissionResult {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                simulate_with(seed_name, &mut *rng)
            }
            None => simulate(seed_name),
        }
    }
}
