//! Time signature detection
//!
//! Infers beats per bar from the accent pattern of the onset strength envelope
//! sampled between consecutive beats. Only 3/4 and 4/4 are reported; anything
//! else falls back to 4/4.
//!
//! # Algorithm
//!
//! 1. Convert beat times to onset-envelope frames (`floor(t * sr / hop)`)
//! 2. Per-beat strength: mean envelope over `[f_i, f_{i+1})` (the last beat runs
//!    to the end of the envelope; an empty interval uses `env[f_i]`)
//! 3. Full autocorrelation of the mean-centered strength sequence
//! 4. Take lags 1..16, restrict to window indices 2..7 and pick the first
//!    maximum; `lag = index + 3`
//! 5. Lags outside {3, 4} become 4
//!
//! Fewer than 6 beats, or a strength sequence with no variance, is not enough
//! evidence and yields 4.
//!
//! # Example
//!
//! ```no_run
//! use chordmaster_dsp::features::beat_tracking::estimate_beats_per_bar;
//! use chordmaster_dsp::AnalysisConfig;
//!
//! let samples = vec![0.0f32; 22050 * 4];
//! let beats = vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];
//! let beats_per_bar = estimate_beats_per_bar(&samples, 22050, &beats, &AnalysisConfig::default())?;
//! assert!(beats_per_bar == 3 || beats_per_bar == 4);
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::onset_strength;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Below this many beats the accent autocorrelation is unreliable
pub const MIN_METER_BEATS: usize = 6;

/// Autocorrelation lags examined (exclusive upper bound)
const MAX_METER_LAG: usize = 16;

/// Window indices searched for the bar period (exclusive upper bound)
const LAG_SEARCH: std::ops::Range<usize> = 2..7;

/// Window index to lag conversion offset
const LAG_OFFSET: usize = 3;

/// Musical time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSignature {
    /// 3/4 time (waltz time)
    ThreeFour,
    /// 4/4 time (common time)
    #[default]
    FourFour,
}

impl TimeSignature {
    /// Map a beats-per-bar estimate onto a supported signature
    ///
    /// Anything other than 3 is treated as 4/4.
    pub fn from_beats_per_bar(beats_per_bar: usize) -> Self {
        match beats_per_bar {
            3 => TimeSignature::ThreeFour,
            _ => TimeSignature::FourFour,
        }
    }

    /// Get beats per bar for this time signature
    pub fn beats_per_bar(&self) -> u32 {
        match self {
            TimeSignature::ThreeFour => 3,
            TimeSignature::FourFour => 4,
        }
    }

    /// Get name as string (e.g., "4/4", "3/4")
    pub fn name(&self) -> &'static str {
        match self {
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::FourFour => "4/4",
        }
    }
}

/// Estimate beats per bar from a waveform and its beat timeline
///
/// Computes the onset strength envelope with the configured STFT parameters
/// and delegates to [`estimate_beats_per_bar_from_envelope`].
///
/// # Returns
///
/// 3 or 4 (4 on insufficient data)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or invalid
/// STFT parameters.
pub fn estimate_beats_per_bar(
    samples: &[f32],
    sample_rate: u32,
    beats: &[f32],
    config: &AnalysisConfig,
) -> Result<u32, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }
    if beats.len() < MIN_METER_BEATS {
        return Ok(TimeSignature::FourFour.beats_per_bar());
    }

    let envelope = onset_strength(samples, config.frame_size, config.hop_size)?;
    Ok(estimate_beats_per_bar_from_envelope(
        &envelope,
        beats,
        sample_rate,
        config.hop_size,
    ))
}

/// Estimate beats per bar from a pre-computed onset strength envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength, one value per frame
/// * `beats` - Beat times in seconds (sorted)
/// * `sample_rate` - Sample rate the envelope was computed at
/// * `hop_size` - Hop size of the envelope frames
pub fn estimate_beats_per_bar_from_envelope(
    envelope: &[f32],
    beats: &[f32],
    sample_rate: u32,
    hop_size: usize,
) -> u32 {
    detect_time_signature(envelope, beats, sample_rate, hop_size)
        .unwrap_or_default()
        .beats_per_bar()
}

/// Infer the time signature from the beat accent pattern
///
/// Returns `None` when there is not enough evidence (fewer than
/// [`MIN_METER_BEATS`] beats, an empty envelope, or beat strengths with no
/// variance); callers treat that as 4/4.
pub fn detect_time_signature(
    envelope: &[f32],
    beats: &[f32],
    sample_rate: u32,
    hop_size: usize,
) -> Option<TimeSignature> {
    if beats.len() < MIN_METER_BEATS {
        log::debug!(
            "Only {} beats (< {}); assuming 4/4",
            beats.len(),
            MIN_METER_BEATS
        );
        return None;
    }
    if envelope.is_empty() || sample_rate == 0 || hop_size == 0 {
        return None;
    }

    let strengths = beat_strengths(envelope, beats, sample_rate, hop_size);

    let n = strengths.len() as f32;
    let mean = strengths.iter().sum::<f32>() / n;
    let centered: Vec<f32> = strengths.iter().map(|&s| s - mean).collect();
    let variance = centered.iter().map(|&c| c * c).sum::<f32>() / n;
    if variance < EPSILON {
        log::debug!("Beat strengths carry no accent pattern; assuming 4/4");
        return None;
    }

    let acf = full_autocorrelation(&centered);
    let window = &acf[1..MAX_METER_LAG.min(acf.len())];
    let search = &window[LAG_SEARCH.start.min(window.len())..LAG_SEARCH.end.min(window.len())];

    let mut best = 0;
    for (i, &value) in search.iter().enumerate() {
        if value > search[best] {
            best = i;
        }
    }
    let lag = best + LAG_OFFSET;

    let signature = TimeSignature::from_beats_per_bar(lag);
    if signature.beats_per_bar() as usize != lag {
        log::debug!("Meter lag {} outside 3/4 and 4/4; using 4/4", lag);
    } else {
        log::debug!("Meter lag {} -> {}", lag, signature.name());
    }

    Some(signature)
}

/// Mean onset strength in each inter-beat interval
fn beat_strengths(envelope: &[f32], beats: &[f32], sample_rate: u32, hop_size: usize) -> Vec<f32> {
    let frames: Vec<usize> = beats
        .iter()
        .map(|&t| {
            if t <= 0.0 {
                0
            } else {
                (t * sample_rate as f32 / hop_size as f32).floor() as usize
            }
        })
        .collect();

    frames
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = frames.get(i + 1).copied().unwrap_or(envelope.len());
            let end = end.min(envelope.len());
            if start < end {
                let slice = &envelope[start..end];
                slice.iter().sum::<f32>() / slice.len() as f32
            } else {
                envelope.get(start).copied().unwrap_or(0.0)
            }
        })
        .collect()
}

/// Non-negative lags of the full (linear) autocorrelation
fn full_autocorrelation(signal: &[f32]) -> Vec<f32> {
    (0..signal.len())
        .map(|lag| {
            signal[..signal.len() - lag]
                .iter()
                .zip(signal[lag..].iter())
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}
