//! Autocorrelation-based tempo estimation
//!
//! Finds the dominant periodicity of the onset strength envelope.
//!
//! # Algorithm
//!
//! 1. Compute the envelope autocorrelation using FFT acceleration:
//!    `ACF = IFFT(|FFT(envelope)|²)`
//! 2. Restrict lags to the `[min_bpm, max_bpm]` range
//! 3. Weight each lag by a log-normal tempo prior centred on `start_bpm` with a
//!    one-octave standard deviation: `w = exp(-0.5 * log2(bpm / start_bpm)²)`
//! 4. Take the strongest weighted lag and refine it by parabolic interpolation
//! 5. Convert to BPM: `BPM = (60 * sample_rate) / (lag * hop_size)`
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.
//!
//! # Example
//!
//! ```no_run
//! use chordmaster_dsp::features::period::estimate_tempo;
//!
//! let envelope = vec![0.0f32; 1000];
//! if let Some(candidate) = estimate_tempo(&envelope, 22050, 512, 60.0, 180.0, 120.0)? {
//!     println!("{:.1} BPM", candidate.bpm);
//! }
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```

use super::BpmCandidate;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

const EPSILON: f32 = 1e-10;

/// Estimate the global tempo of an onset strength envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength, one value per frame
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size used for the envelope (samples per frame)
/// * `min_bpm` - Minimum BPM to consider (default: 60.0)
/// * `max_bpm` - Maximum BPM to consider (default: 180.0)
/// * `start_bpm` - Centre of the tempo prior (default: 120.0)
///
/// # Returns
///
/// The best candidate, or `None` when the envelope carries no periodic energy
/// (silence, or too short to cover the lag range)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or hop size, or
/// an empty/inverted BPM range.
pub fn estimate_tempo(
    envelope: &[f32],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f32,
    max_bpm: f32,
    start_bpm: f32,
) -> Result<Option<BpmCandidate>, AnalysisError> {
    log::debug!(
        "Estimating tempo: {} frames, {} Hz, hop={}, range=[{:.1}, {:.1}] BPM",
        envelope.len(),
        sample_rate,
        hop_size,
        min_bpm,
        max_bpm
    );

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid hop size: 0".to_string(),
        ));
    }

    if min_bpm <= 0.0 || max_bpm <= 0.0 || min_bpm >= max_bpm || start_bpm <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}] (prior {:.1})",
            min_bpm, max_bpm, start_bpm
        )));
    }

    if envelope.len() < 2 {
        return Ok(None);
    }

    let acf = compute_autocorrelation_fft(envelope)?;
    if acf[0] < EPSILON {
        log::debug!("Onset envelope has no energy; no tempo");
        return Ok(None);
    }

    // BPM = (60 * sample_rate) / (lag * hop_size)
    let frames_per_minute = 60.0 * sample_rate as f32 / hop_size as f32;
    let lag_min = ((frames_per_minute / max_bpm).ceil() as usize).max(1);
    let lag_max = ((frames_per_minute / min_bpm).floor() as usize).min(acf.len() - 1);

    if lag_min > lag_max {
        log::warn!(
            "Envelope too short for tempo search: lags [{}, {}], ACF length {}",
            lag_min,
            lag_max,
            acf.len()
        );
        return Ok(None);
    }

    let weighted: Vec<f32> = (0..acf.len())
        .map(|lag| {
            if lag == 0 {
                0.0
            } else {
                acf[lag] * tempo_prior(frames_per_minute / lag as f32, start_bpm)
            }
        })
        .collect();

    let mut best_lag = lag_min;
    for lag in lag_min..=lag_max {
        if weighted[lag] > weighted[best_lag] {
            best_lag = lag;
        }
    }

    if weighted[best_lag] < EPSILON {
        return Ok(None);
    }

    let refined_lag = refine_peak(&weighted, best_lag);
    let bpm = (frames_per_minute / refined_lag).clamp(min_bpm, max_bpm);
    let confidence = (weighted[best_lag] / acf[0]).clamp(0.0, 1.0);

    log::debug!(
        "Tempo: lag={} (refined {:.2}) -> {:.2} BPM, confidence={:.3}",
        best_lag,
        refined_lag,
        bpm,
        confidence
    );

    Ok(Some(BpmCandidate { bpm, confidence }))
}

/// Log-normal tempo prior with a one-octave standard deviation
fn tempo_prior(bpm: f32, start_bpm: f32) -> f32 {
    let octaves = (bpm / start_bpm).log2();
    (-0.5 * octaves * octaves).exp()
}

/// Parabolic interpolation of a peak at `index`
///
/// Falls back to the integer index at the array edges or on a flat top.
fn refine_peak(values: &[f32], index: usize) -> f32 {
    if index == 0 || index + 1 >= values.len() {
        return index as f32;
    }
    let (left, center, right) = (values[index - 1], values[index], values[index + 1]);
    let denom = left - 2.0 * center + right;
    if denom.abs() < EPSILON {
        return index as f32;
    }
    let offset = (0.5 * (left - right) / denom).clamp(-0.5, 0.5);
    index as f32 + offset
}

/// Compute autocorrelation using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²)
///
/// # Arguments
///
/// * `signal` - Input signal
///
/// # Returns
///
/// Linear (non-circular) autocorrelation for lags `0..signal.len()`
pub fn compute_autocorrelation_fft(signal: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    let n = signal.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // FFT size: next power of 2 >= 2*n (zero-padding avoids wrap-around)
    let fft_size = (2 * n).next_power_of_two();

    let mut fft_input: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft_input.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut fft_input);

    for x in &mut fft_input {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut fft_input);

    let scale = 1.0 / (fft_size as f32);
    let acf: Vec<f32> = fft_input[..n]
        .iter()
        .map(|x| (x.re * scale).max(0.0))
        .collect();

    if acf.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NumericalError(
            "Non-finite autocorrelation value".to_string(),
        ));
    }

    Ok(acf)
}
