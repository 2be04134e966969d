//! Error types for the music-feature estimation engine

use std::fmt;

/// Errors that can occur during audio analysis
///
/// Degenerate musical content (silence, empty bars, too few beats) is never an
/// error: those cases fall back to documented defaults. Only structurally
/// invalid input or failing I/O surfaces here.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters (empty waveform, zero sample rate, bad beat timeline)
    InvalidInput(String),

    /// Audio decoding error
    DecodingError(String),

    /// Processing error during analysis (resampler failures)
    ProcessingError(String),

    /// Numerical error (non-finite values, overflow, etc.)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
