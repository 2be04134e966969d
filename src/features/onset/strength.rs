//! Onset strength envelope
//!
//! Frame-wise log-magnitude spectral flux:
//!
//! 1. Centered STFT magnitudes (shared `features::spectrum`)
//! 2. Log compression: `L[t][k] = ln(1 + COMPRESSION * |X[t][k]|)`
//! 3. Half-wave rectified difference against the previous frame, summed over bins
//!
//! Stationary tones contribute (almost) nothing; note and drum attacks produce
//! peaks. Frame 0 has no predecessor and is 0.
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use crate::error::AnalysisError;
use crate::features::spectrum::magnitude_spectrogram;

/// Log compression gain applied to magnitudes before differencing
const COMPRESSION: f32 = 1.0;

/// Compute the onset strength envelope of `samples`
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - STFT frame size (typically 2048)
/// * `hop_size` - Hop size (typically 512)
///
/// # Returns
///
/// One non-negative value per STFT frame, aligned with the chroma frames when
/// the hop sizes match.
///
/// # Errors
///
/// Returns `AnalysisError` if frame or hop size is 0.
///
/// # Example
///
/// ```no_run
/// use chordmaster_dsp::features::onset::onset_strength;
///
/// let samples = vec![0.0f32; 22050];
/// let envelope = onset_strength(&samples, 2048, 512)?;
/// # Ok::<(), chordmaster_dsp::AnalysisError>(())
/// ```
pub fn onset_strength(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<f32>, AnalysisError> {
    let spectrogram = magnitude_spectrogram(samples, frame_size, hop_size)?;
    if spectrogram.is_empty() {
        return Ok(Vec::new());
    }

    let log_frames: Vec<Vec<f32>> = spectrogram
        .iter()
        .map(|frame| frame.iter().map(|&m| (COMPRESSION * m).ln_1p()).collect())
        .collect();

    let mut envelope = Vec::with_capacity(log_frames.len());
    envelope.push(0.0);
    for pair in log_frames.windows(2) {
        let flux: f32 = pair[0]
            .iter()
            .zip(pair[1].iter())
            .map(|(&prev, &curr)| (curr - prev).max(0.0))
            .sum();
        envelope.push(flux);
    }

    log::debug!(
        "Onset envelope: {} frames, peak={:.3}",
        envelope.len(),
        envelope.iter().copied().fold(0.0f32, f32::max)
    );

    Ok(envelope)
}
