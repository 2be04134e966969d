//! Beat tracking modules
//!
//! Place beats on the onset strength envelope and infer the meter:
//! - Dynamic-programming beat tracker (tempo + beat positions)
//! - Beats-per-bar estimation from beat-synchronous onset strength

pub mod time_signature;
pub mod tracker;

pub use time_signature::{detect_time_signature, estimate_beats_per_bar, TimeSignature};
pub use tracker::track_beats;

/// Tempo and beat positions produced by the tracker
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeatTrackingResult {
    /// Global tempo estimate in BPM (0.0 when no periodicity was found)
    pub tempo_bpm: f32,

    /// Beat positions as onset-envelope frame indices (strictly increasing)
    pub beat_frames: Vec<usize>,

    /// Beat positions in seconds (strictly increasing)
    pub beats: Vec<f32>,
}

impl BeatTrackingResult {
    /// True if no beats were placed
    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}
