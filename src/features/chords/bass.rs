//! Bass-note hint
//!
//! Estimates the dominant low-register pitch class of a waveform segment by
//! projecting it through the reduced-octave chroma range and taking the
//! strongest mean pitch class.

use crate::analysis::result::PitchClass;
use crate::error::AnalysisError;
use crate::features::chroma::normalization::EPSILON;
use crate::features::chroma::{extract_chroma, ChromaConfig};

/// Segments shorter than this carry too little low-frequency resolution
pub const MIN_BASS_SAMPLES: usize = 1024;

/// Detect the bass pitch class of a waveform segment
///
/// # Arguments
///
/// * `segment` - Mono samples of the segment
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Reduced-octave chroma parameters (see `AnalysisConfig::bass_chroma_config`)
///
/// # Returns
///
/// `None` if the segment is shorter than [`MIN_BASS_SAMPLES`], its chroma is
/// empty, or it has no low-register energy; otherwise the pitch class with the
/// highest mean energy (lowest index on ties).
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for invalid chroma parameters.
pub fn detect_bass(
    segment: &[f32],
    sample_rate: u32,
    config: &ChromaConfig,
) -> Result<Option<PitchClass>, AnalysisError> {
    if segment.len() < MIN_BASS_SAMPLES {
        return Ok(None);
    }

    let chroma = extract_chroma(segment, sample_rate, config)?;
    if chroma.is_empty() {
        return Ok(None);
    }

    let mean = chroma.mean();
    let mut best = 0;
    for (i, &v) in mean.iter().enumerate() {
        if v > mean[best] {
            best = i;
        }
    }

    if mean[best] <= EPSILON {
        return Ok(None);
    }

    Ok(Some(PitchClass::new(best)))
}
