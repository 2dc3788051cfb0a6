use serde::{Deserialize, Serialize};

/// Lower bound of a detection confidence.
pub const MIN_CONFIDENCE: f64 = 0.0;
/// Upper bound of a detection confidence.
pub const MAX_CONFIDENCE: f64 = 1.0;
/// Upper bound of a target match score (percentage).
pub const MAX_SCORE: f64 = 100.0;

/// One text fragment recognized by one OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub text: String,
    /// 0.0 to 1.0 inclusive.
    pub confidence: f64,
    /// Name of the recognition backend (e.g. "tesseract").
    pub engine: String,
    /// `[left, top, right, bottom]` in pixels, absent when the engine reports no geometry.
    #[serde(rename = "bbox", default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<[f64; 4]>,
}

impl Detection {
    pub fn new(text: impl Into<String>, confidence: f64, engine: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence,
            engine: engine.into(),
            bounding_box: None,
        }
    }

    pub fn with_bounding_box(mut self, bbox: [f64; 4]) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    /// Confidence expressed on the same 0-100 scale as [`TargetMatch::score`].
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// The best pattern-shaped token found in the full text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetMatch {
    /// Full line containing the match.
    pub matched_text: String,
    /// 0 to 100.
    pub score: f64,
    pub pattern_found: String,
}

/// Complete outcome of one submission, as returned by the backend or the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionResult {
    pub success: bool,
    pub target_match: Option<TargetMatch>,
    /// Engine order as received; not sorted by confidence.
    #[serde(rename = "ocr_results", default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub preprocessing_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionResult {
    /// Error reported by the backend inside a well-formed body, if any.
    pub fn backend_error(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            self.error.as_deref()
        }
    }

    /// Check that every score and confidence lies within its documented range.
    pub fn check_ranges(&self) -> Result<(), String> {
        if let Some(m) = &self.target_match {
            if !(0.0..=MAX_SCORE).contains(&m.score) {
                return Err(format!("target match score {} outside 0..=100", m.score));
            }
        }
        for (i, d) in self.detections.iter().enumerate() {
            if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&d.confidence) {
                return Err(format!(
                    "detection {i} ({}) confidence {} outside 0..=1",
                    d.engine, d.confidence
                ));
            }
        }
        Ok(())
    }

    /// Distinct engine names in order of first appearance.
    pub fn engines(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for d in &self.detections {
            if !seen.contains(&d.engine.as_str()) {
                seen.push(&d.engine);
            }
        }
        seen
    }
}
