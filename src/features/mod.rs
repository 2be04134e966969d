//! Feature extraction modules
//!
//! This module contains the signal-level building blocks of the analysis:
//! - Short-time spectrum (shared STFT)
//! - Chroma extraction (full range and bass range)
//! - Onset strength envelope
//! - Period estimation (tempo)
//! - Beat tracking and meter
//! - Key detection
//! - Chord templates and per-bar labeling

pub mod beat_tracking;
pub mod chords;
pub mod chroma;
pub mod key;
pub mod onset;
pub mod period;
pub mod spectrum;
