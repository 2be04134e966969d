//! Analysis metadata structures

use serde::{Deserialize, Serialize};

use super::result::AnalysisFlag;

/// Analysis metadata
///
/// Holds no wall-clock measurements so that results stay reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Duration of the analyzed waveform in seconds
    pub duration_seconds: f32,

    /// Sample rate the features were computed at
    pub sample_rate: u32,

    /// Algorithm version
    pub algorithm_version: String,

    /// Number of beats in the timeline
    pub beat_count: usize,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Human-readable notes on fallbacks taken during analysis
    pub warnings: Vec<String>,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: 0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            beat_count: 0,
            flags: vec![],
            warnings: vec![],
        }
    }
}
