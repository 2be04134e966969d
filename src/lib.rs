//! # Chordmaster DSP
//!
//! A music analysis engine that turns a mono waveform into a bar-aligned chord
//! chart: tempo, musical key, beats per bar, and one chord label per bar.
//!
//! ## Features
//!
//! - **Tempo & Beats**: Spectral-flux onset envelope, autocorrelation tempo with a
//!   log-normal prior, dynamic-programming beat tracking
//! - **Key Detection**: Chroma-based analysis with Krumhansl-Kessler template matching
//! - **Meter**: 3/4 vs 4/4 from the beat-synchronous accent pattern
//! - **Chords**: Per-bar template matching over 60 chords with a bass-note hint
//!
//! ## Quick Start
//!
//! ```no_run
//! use chordmaster_dsp::{analyze_audio, AnalysisConfig};
//!
//! // Load audio samples (mono, f32)
//! let samples: Vec<f32> = vec![0.0; 22050 * 10]; // Your audio data
//! let sample_rate = 22050;
//!
//! // Analyze
//! let result = analyze_audio(&samples, sample_rate, AnalysisConfig::default())?;
//!
//! println!("Tempo: {:.1} BPM", result.tempo_bpm);
//! println!("Key: {} {}", result.key_root, result.mode);
//! for bar in &result.bars {
//!     println!("{:>3} {:>6.2}s {}", bar.index, bar.start_time, bar.chord);
//! }
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! Audio Input -> Preprocessing -> Onset Envelope -> Tempo & Beats -> Meter
//!                      \-> Chroma -> Key                             |
//!                               \-> Bar Segmentation -> Chord Labels <-/
//! ```
//!
//! Every stage is a pure function of its inputs: the same waveform and
//! configuration always yield an equal [`AnalysisResult`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::report::{ChartBar, ChordChart};
pub use analysis::result::{AnalysisFlag, AnalysisResult, Bar, Key, Mode, PitchClass};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::chords::{Chord, ChordLabel, ChordQuality};

use std::time::Instant;

use features::beat_tracking::{detect_time_signature, track_beats, TimeSignature};
use features::chords::{label_bars, ChordTemplateBank};
use features::chroma::extract_chroma;
use features::key::{estimate_key, WEAK_TONALITY_CLARITY};
use features::onset::onset_strength;
use preprocessing::normalization::normalize;
use preprocessing::resample::resample;

/// Main analysis function
///
/// Analyzes a mono waveform and returns tempo, key, meter, beat timeline and
/// the bar-aligned chord progression.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, nominally in [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisResult` with tempo, key (root, mode, confidence, clarity), beats per
/// bar, beats and bars. Silence is not an error: it yields tempo 0, no beats
/// and no bars.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input, a zero sample rate, or
/// non-finite samples.
///
/// # Example
///
/// ```no_run
/// use chordmaster_dsp::{analyze_audio, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100 * 30]; // 30 seconds of silence
/// let result = analyze_audio(&samples, 44100, AnalysisConfig::default())?;
/// assert!(result.bars.is_empty());
/// # Ok::<(), chordmaster_dsp::AnalysisError>(())
/// ```
pub fn analyze_audio(
    samples: &[f32],
    sample_rate: u32,
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let start_time = Instant::now();

    log::debug!(
        "Starting audio analysis: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    validate_waveform(samples, sample_rate)?;
    let duration = samples.len() as f32 / sample_rate as f32;
    let (processed, rate) = preprocess(samples, sample_rate, &config)?;

    let envelope = onset_strength(&processed, config.frame_size, config.hop_size)?;
    let mut tracking = track_beats(&envelope, rate, config.hop_size, &config)?;
    tracking.beats.retain(|&t| t < duration);

    log::debug!(
        "Beat tracking: {:.1} BPM, {} beats",
        tracking.tempo_bpm,
        tracking.beats.len()
    );

    let result = assemble(
        &processed,
        rate,
        duration,
        &envelope,
        tracking.tempo_bpm,
        tracking.beats,
        &config,
    )?;

    log::info!(
        "Analysis complete: {:.1} BPM, key {} {}, {} bars in {:.1} ms",
        result.tempo_bpm,
        result.key_root,
        result.mode,
        result.bars.len(),
        start_time.elapsed().as_secs_f32() * 1000.0
    );

    Ok(result)
}

/// Analyze with an externally supplied beat timeline
///
/// Skips tempo estimation and beat tracking; key, meter and chords are computed
/// as in [`analyze_audio`]. Beat times are in seconds from the start of
/// `samples` and are unaffected by resampling.
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `beats` - Strictly increasing, non-negative beat times in seconds
/// * `tempo_bpm` - Tempo to report (not re-estimated)
/// * `config` - Analysis configuration parameters
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for invalid audio (see
/// [`analyze_audio`]), a negative or non-finite tempo, or a beat timeline that
/// is not finite, non-negative, strictly increasing and inside the waveform
/// (every beat earlier than `samples.len() / sample_rate`).
pub fn analyze_with_beats(
    samples: &[f32],
    sample_rate: u32,
    beats: &[f32],
    tempo_bpm: f32,
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    if !tempo_bpm.is_finite() || tempo_bpm < 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid tempo: {}",
            tempo_bpm
        )));
    }
    if let Some(bad) = beats.iter().find(|t| !t.is_finite() || **t < 0.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid beat time: {}",
            bad
        )));
    }
    if beats.windows(2).any(|w| w[1] <= w[0]) {
        return Err(AnalysisError::InvalidInput(
            "Beat times must be strictly increasing".to_string(),
        ));
    }

    validate_waveform(samples, sample_rate)?;
    let duration = samples.len() as f32 / sample_rate as f32;
    if let Some(&last) = beats.last() {
        if last >= duration {
            return Err(AnalysisError::InvalidInput(format!(
                "Beat time {:.3}s is not inside the {:.3}s waveform",
                last, duration
            )));
        }
    }

    let (processed, rate) = preprocess(samples, sample_rate, &config)?;
    let envelope = onset_strength(&processed, config.frame_size, config.hop_size)?;

    assemble(
        &processed,
        rate,
        duration,
        &envelope,
        tempo_bpm,
        beats.to_vec(),
        &config,
    )
}

/// Reject empty input, a zero sample rate and non-finite samples
fn validate_waveform(samples: &[f32], sample_rate: u32) -> Result<(), AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Empty audio samples".to_string(),
        ));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate".to_string(),
        ));
    }

    if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "Non-finite sample at index {}",
            pos
        )));
    }

    Ok(())
}

/// Resample and normalize a validated waveform
///
/// Returns the processed samples and the rate they are at.
fn preprocess(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<(Vec<f32>, u32), AnalysisError> {
    let (mut processed, rate) = match config.target_sample_rate {
        Some(target) if target != sample_rate => {
            log::debug!("Resampling {} Hz -> {} Hz", sample_rate, target);
            (resample(samples, sample_rate, target)?, target)
        }
        _ => (samples.to_vec(), sample_rate),
    };

    if let Some(method) = config.normalization {
        let loudness = normalize(&mut processed, method)?;
        log::debug!(
            "Normalized ({:?}): peak {:.1} dB, gain {:.1} dB",
            method,
            loudness.peak_db,
            loudness.gain_db
        );
    }

    Ok((processed, rate))
}

/// Key, meter and bar labeling over a fixed beat timeline
///
/// `duration` is the length of the caller's waveform, which can differ from
/// `samples.len() / sample_rate` by a fraction of a sample after resampling.
fn assemble(
    samples: &[f32],
    sample_rate: u32,
    duration: f32,
    envelope: &[f32],
    tempo_bpm: f32,
    beats: Vec<f32>,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let mut flags = Vec::new();
    let mut warnings = Vec::new();

    let chroma = extract_chroma(samples, sample_rate, &config.chroma_config())?;
    let key = estimate_key(&chroma);
    if key.clarity < WEAK_TONALITY_CLARITY {
        flags.push(AnalysisFlag::WeakTonality);
        warnings.push(format!(
            "Weak tonality: key clarity {:.3} (best {})",
            key.clarity,
            key.key.name()
        ));
    }

    let signature = match detect_time_signature(envelope, &beats, sample_rate, config.hop_size) {
        Some(signature) => signature,
        None => {
            let warning = format!(
                "Meter not determinable from {} beats; assuming 4/4",
                beats.len()
            );
            log::warn!("{}", warning);
            flags.push(AnalysisFlag::MeterFallback);
            warnings.push(warning);
            TimeSignature::FourFour
        }
    };
    let beats_per_bar = signature.beats_per_bar();

    if beats.is_empty() {
        flags.push(AnalysisFlag::NoBeatsDetected);
        warnings.push("No beats detected; chord chart is empty".to_string());
    }

    let bars = label_bars(
        &chroma,
        &beats,
        beats_per_bar as usize,
        samples,
        sample_rate,
        duration,
        ChordTemplateBank::shared(),
        &config.bass_chroma_config(),
    )?;

    let tempo_bpm = if beats.is_empty() { 0.0 } else { tempo_bpm };

    Ok(AnalysisResult {
        tempo_bpm,
        key_root: key.key.root(),
        mode: key.key.mode(),
        key_confidence: key.confidence,
        key_clarity: key.clarity,
        beats_per_bar,
        metadata: AnalysisMetadata {
            duration_seconds: duration,
            sample_rate,
            beat_count: beats.len(),
            flags,
            warnings,
            ..AnalysisMetadata::default()
        },
        beats,
        bars,
    })
}
