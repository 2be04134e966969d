//! Audio normalization utilities
//!
//! Supports two normalization methods:
//! - Peak normalization (fast, scales the loudest sample to just below full scale)
//! - RMS normalization (scales average level to a target, limited to avoid clipping)
//!
//! Silent input is left untouched.
//!
//! # Example
//!
//! ```no_run
//! use chordmaster_dsp::preprocessing::normalization::{normalize, NormalizationMethod};
//!
//! let mut samples = vec![0.25f32; 22050];
//! let metadata = normalize(&mut samples, NormalizationMethod::Peak)?;
//! println!("applied {:.1} dB", metadata.gain_db);
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```

use crate::error::AnalysisError;

/// Normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationMethod {
    /// Simple peak normalization (fast, scales to max peak)
    Peak,
    /// RMS-based normalization (scales to target RMS level)
    Rms,
}

/// Loudness metadata returned from normalization
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessMetadata {
    /// Peak level in dB (before normalization)
    pub peak_db: f32,
    /// RMS level in dB (before normalization)
    pub rms_db: f32,
    /// Gain applied in dB
    pub gain_db: f32,
}

impl Default for LoudnessMetadata {
    fn default() -> Self {
        Self {
            peak_db: f32::NEG_INFINITY,
            rms_db: f32::NEG_INFINITY,
            gain_db: 0.0,
        }
    }
}

/// Numerical stability epsilon for divisions
const EPSILON: f32 = 1e-10;

/// Headroom left below full scale by peak normalization
const PEAK_HEADROOM_DB: f32 = 1.0;

/// Target level for RMS normalization
const TARGET_RMS_DB: f32 = -20.0;

/// Normalize audio samples in place
///
/// # Arguments
///
/// * `samples` - Audio samples, modified in place
/// * `method` - Normalization method
///
/// # Returns
///
/// Levels measured before normalization and the gain applied
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input.
pub fn normalize(
    samples: &mut [f32],
    method: NormalizationMethod,
) -> Result<LoudnessMetadata, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty audio samples".to_string(),
        ));
    }

    match method {
        NormalizationMethod::Peak => Ok(normalize_peak(samples)),
        NormalizationMethod::Rms => Ok(normalize_rms(samples)),
    }
}

fn peak_of(samples: &[f32]) -> f32 {
    samples.iter().map(|&x| x.abs()).fold(0.0f32, f32::max)
}

fn rms_of(samples: &[f32]) -> f32 {
    (samples.iter().map(|&x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}

fn to_db(level: f32) -> f32 {
    if level > EPSILON {
        20.0 * level.log10()
    } else {
        f32::NEG_INFINITY
    }
}

fn apply_gain(samples: &mut [f32], gain_linear: f32) {
    for sample in samples.iter_mut() {
        *sample *= gain_linear;
    }
}

/// Normalize audio samples using peak normalization
fn normalize_peak(samples: &mut [f32]) -> LoudnessMetadata {
    let peak = peak_of(samples);

    if peak <= EPSILON {
        log::warn!("Audio is silent or extremely quiet, cannot normalize");
        return LoudnessMetadata::default();
    }

    let peak_db = to_db(peak);
    let rms_db = to_db(rms_of(samples));

    let target_peak_linear = 10.0_f32.powf(-PEAK_HEADROOM_DB / 20.0);
    let gain_linear = target_peak_linear / peak;
    apply_gain(samples, gain_linear);

    let gain_db = to_db(gain_linear);
    log::debug!(
        "Peak normalization: peak={:.2} dB, gain={:.2} dB",
        peak_db,
        gain_db
    );

    LoudnessMetadata {
        peak_db,
        rms_db,
        gain_db,
    }
}

/// Normalize audio samples using RMS normalization
fn normalize_rms(samples: &mut [f32]) -> LoudnessMetadata {
    let rms = rms_of(samples);

    if rms <= EPSILON {
        log::warn!("Audio is silent or extremely quiet, cannot normalize");
        return LoudnessMetadata::default();
    }

    let rms_db = to_db(rms);
    let peak = peak_of(samples);
    let peak_db = to_db(peak);

    let target_rms_linear = 10.0_f32.powf(TARGET_RMS_DB / 20.0);
    let mut gain_linear = target_rms_linear / rms;

    // Check if gain would cause clipping
    if peak * gain_linear > 1.0 {
        log::warn!("RMS normalization would cause clipping, limiting gain");
        gain_linear = 1.0 / peak;
    }

    apply_gain(samples, gain_linear);

    let gain_db = to_db(gain_linear);
    log::debug!(
        "RMS normalization: rms={:.2} dB, gain={:.2} dB",
        rms_db,
        gain_db
    );

    LoudnessMetadata {
        peak_db,
        rms_db,
        gain_db,
    }
}
