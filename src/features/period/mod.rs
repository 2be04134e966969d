//! Period estimation modules
//!
//! Convert the onset strength envelope to a global tempo estimate using
//! FFT-accelerated autocorrelation weighted by a tempo prior.

pub mod autocorrelation;

pub use autocorrelation::estimate_tempo;

/// BPM candidate with confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmCandidate {
    /// BPM estimate
    pub bpm: f32,

    /// Confidence score (0.0-1.0): prior-weighted autocorrelation at the
    /// chosen lag relative to the zero-lag energy
    pub confidence: f32,
}
