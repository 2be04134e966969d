//! Key detection modules
//!
//! Detect musical key using:
//! - Krumhansl-Kessler templates (24 keys)
//! - Template matching
//! - Key clarity scoring

pub mod detector;
pub mod key_clarity;
pub mod templates;

pub use detector::{estimate_key, estimate_key_from_profile};
pub use key_clarity::compute_key_clarity;
pub use templates::KeyTemplates;

use crate::analysis::result::Key;

/// Key clarity below which tonality is reported as weak
pub const WEAK_TONALITY_CLARITY: f32 = 0.05;

/// Key detection result
#[derive(Debug, Clone)]
pub struct KeyDetectionResult {
    /// Detected key (best match)
    pub key: Key,

    /// Confidence score: dot product of the normalized chroma with the winning template
    pub confidence: f32,

    /// Relative margin between the best and second-best scores (0.0-1.0)
    pub clarity: f32,

    /// All 24 key scores (ranked, highest first)
    pub all_scores: Vec<(Key, f32)>,
}
