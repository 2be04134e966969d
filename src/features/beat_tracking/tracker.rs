//! Dynamic-programming beat tracker
//!
//! Places beats on the onset strength envelope so that they coincide with
//! strong onsets while staying close to a globally estimated beat period.
//!
//! # Algorithm
//!
//! 1. Estimate the global tempo from the envelope autocorrelation
//!    (`features::period`)
//! 2. Normalize the envelope by its standard deviation and smooth it with a
//!    narrow Gaussian window to obtain the local score
//! 3. Cumulative score: `C[i] = local[i] + max_d (C[i - d] - tightness * ln(d / period)²)`
//!    over predecessor distances `d ∈ [period / 2, 2 * period]`
//! 4. Pick the last beat among the cumulative-score local maxima, then follow
//!    the back-links to recover the beat sequence
//! 5. Trim weak leading/trailing beats
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.
//!
//! # Example
//!
//! ```no_run
//! use chordmaster_dsp::features::beat_tracking::track_beats;
//! use chordmaster_dsp::AnalysisConfig;
//!
//! let envelope = vec![0.0f32; 1000];
//! let result = track_beats(&envelope, 22050, 512, &AnalysisConfig::default())?;
//! println!("{:.1} BPM, {} beats", result.tempo_bpm, result.beats.len());
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```

use super::BeatTrackingResult;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::period::estimate_tempo;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Width control of the local-score smoothing window
const SMOOTHING_RESOLUTION: f32 = 32.0;

/// Fraction of the peak local score that starts the first beat
const FIRST_BEAT_THRESHOLD: f32 = 0.01;

/// Fraction of the median cumulative-score peak the last beat must reach
const LAST_BEAT_THRESHOLD: f32 = 0.5;

/// Fraction of the RMS beat strength below which edge beats are trimmed
const TRIM_THRESHOLD: f32 = 0.5;

/// Track beats in an onset strength envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength, one value per frame
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size of the envelope frames
/// * `config` - Tempo range, prior and tightness
///
/// # Returns
///
/// Tempo and strictly increasing beat positions. Silence (or an envelope with
/// no periodicity) yields tempo 0 and no beats.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or hop size, or
/// an invalid BPM range.
pub fn track_beats(
    envelope: &[f32],
    sample_rate: u32,
    hop_size: usize,
    config: &AnalysisConfig,
) -> Result<BeatTrackingResult, AnalysisError> {
    let candidate = estimate_tempo(
        envelope,
        sample_rate,
        hop_size,
        config.min_bpm,
        config.max_bpm,
        config.start_bpm,
    )?;

    let Some(candidate) = candidate else {
        log::warn!("No tempo found in onset envelope; returning empty beat grid");
        return Ok(BeatTrackingResult::default());
    };

    let period = 60.0 * sample_rate as f32 / (hop_size as f32 * candidate.bpm);
    let beat_frames = dp_beats(envelope, period, config.beat_tightness);

    let beats: Vec<f32> = beat_frames
        .iter()
        .map(|&frame| frame as f32 * hop_size as f32 / sample_rate as f32)
        .collect();

    log::debug!(
        "Beat tracker: {:.2} BPM (period {:.2} frames), {} beats",
        candidate.bpm,
        period,
        beats.len()
    );

    Ok(BeatTrackingResult {
        tempo_bpm: if beats.is_empty() { 0.0 } else { candidate.bpm },
        beat_frames,
        beats,
    })
}

/// Place beats by dynamic programming for a fixed `period` (in frames)
fn dp_beats(envelope: &[f32], period: f32, tightness: f32) -> Vec<usize> {
    let n = envelope.len();
    if n == 0 || !period.is_finite() || period <= 0.0 {
        return Vec::new();
    }

    let std = std_dev(envelope);
    if std < EPSILON {
        return Vec::new();
    }
    let normalized: Vec<f32> = envelope.iter().map(|&v| v / std).collect();
    let local = gaussian_smooth(&normalized, period);

    let max_local = local.iter().copied().fold(0.0f32, f32::max);
    if max_local < EPSILON {
        return Vec::new();
    }

    let d_min = ((period / 2.0).round() as usize).max(1);
    let d_max = ((2.0 * period).round() as usize).max(d_min);
    let transition: Vec<(usize, f32)> = (d_min..=d_max)
        .map(|d| {
            let log_ratio = (d as f32 / period).ln();
            (d, -tightness * log_ratio * log_ratio)
        })
        .collect();

    let mut cumscore = vec![0.0f32; n];
    let mut backlink: Vec<Option<usize>> = vec![None; n];
    let mut first_beat = true;

    for i in 0..n {
        let mut best_score = f32::NEG_INFINITY;
        let mut best_pred = None;
        for &(d, cost) in &transition {
            let (score, pred) = if i >= d {
                (cumscore[i - d] + cost, Some(i - d))
            } else {
                (cost, None)
            };
            if score > best_score {
                best_score = score;
                best_pred = pred;
            }
        }

        cumscore[i] = local[i] + best_score;

        if first_beat && local[i] < FIRST_BEAT_THRESHOLD * max_local {
            backlink[i] = None;
        } else {
            backlink[i] = best_pred;
            first_beat = false;
        }
    }

    let last = last_beat(&cumscore);
    let mut beats = vec![last];
    let mut current = last;
    while let Some(prev) = backlink[current] {
        beats.push(prev);
        current = prev;
    }
    beats.reverse();

    trim_beats(&local, beats)
}

/// Population standard deviation
fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n;
    variance.sqrt()
}

/// Smooth with `exp(-0.5 * (k * 32 / period)²)` for `k ∈ [-round(period), round(period)]`
fn gaussian_smooth(values: &[f32], period: f32) -> Vec<f32> {
    let half = (period.round() as isize).max(1);
    let window: Vec<f32> = (-half..=half)
        .map(|k| {
            let x = k as f32 * SMOOTHING_RESOLUTION / period;
            (-0.5 * x * x).exp()
        })
        .collect();

    let n = values.len() as isize;
    (0..n)
        .map(|i| {
            window
                .iter()
                .enumerate()
                .filter_map(|(w, &weight)| {
                    let idx = i + w as isize - half;
                    if idx >= 0 && idx < n {
                        Some(values[idx as usize] * weight)
                    } else {
                        None
                    }
                })
                .sum()
        })
        .collect()
}

/// Last cumulative-score local maximum reaching half the median peak
fn last_beat(cumscore: &[f32]) -> usize {
    let n = cumscore.len();
    let maxima: Vec<usize> = (1..n)
        .filter(|&i| cumscore[i] > cumscore[i - 1] && (i + 1 == n || cumscore[i] >= cumscore[i + 1]))
        .collect();

    if maxima.is_empty() {
        return argmax(cumscore);
    }

    let mut peak_values: Vec<f32> = maxima.iter().map(|&i| cumscore[i]).collect();
    peak_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = peak_values.len() / 2;
    let median = if peak_values.len() % 2 == 0 {
        0.5 * (peak_values[mid - 1] + peak_values[mid])
    } else {
        peak_values[mid]
    };

    let threshold = LAST_BEAT_THRESHOLD * median;
    maxima
        .iter()
        .rev()
        .copied()
        .find(|&i| cumscore[i] >= threshold)
        .unwrap_or_else(|| argmax(cumscore))
}

/// Drop leading/trailing beats whose local score is below half the RMS beat score
fn trim_beats(local: &[f32], beats: Vec<usize>) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }

    let mean_square =
        beats.iter().map(|&b| local[b] * local[b]).sum::<f32>() / beats.len() as f32;
    let threshold = TRIM_THRESHOLD * mean_square.sqrt();

    let start = beats.iter().position(|&b| local[b] >= threshold);
    let end = beats.iter().rposition(|&b| local[b] >= threshold);

    match (start, end) {
        (Some(s), Some(e)) => beats[s..=e].to_vec(),
        _ => Vec::new(),
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
