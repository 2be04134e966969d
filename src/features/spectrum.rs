//! Short-time Fourier transform
//!
//! Centered, zero-padded STFT shared by the chroma projection and the onset
//! envelope. Frame `t` is centered on sample `t * hop_size`, so a waveform of
//! `n` samples yields `1 + n / hop_size` frames and frame indices convert to
//! time as `t * hop_size / sample_rate`.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Number of frames a centered STFT produces for `n_samples`
pub fn frame_count(n_samples: usize, hop_size: usize) -> usize {
    if n_samples == 0 || hop_size == 0 {
        0
    } else {
        1 + n_samples / hop_size
    }
}

/// Periodic Hann window
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            0.5 - 0.5 * phase.cos()
        })
        .collect()
}

/// Compute the magnitude spectrogram of `samples`
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - FFT size (window length)
/// * `hop_size` - Distance between frame centers in samples
///
/// # Returns
///
/// One `Vec<f32>` per frame, each holding `frame_size / 2 + 1` bin magnitudes.
/// Empty input yields an empty spectrogram.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `frame_size` or `hop_size` is 0.
pub fn magnitude_spectrogram(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if frame_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Frame size must be > 0".to_string(),
        ));
    }
    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    let n_frames = frame_count(samples.len(), hop_size);
    if n_frames == 0 {
        return Ok(Vec::new());
    }

    let window = hann_window(frame_size);
    let n_bins = frame_size / 2 + 1;
    let half = (frame_size / 2) as isize;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];

    let mut frames = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        let start = (t * hop_size) as isize - half;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let idx = start + i as isize;
            let sample = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize]
            } else {
                0.0
            };
            *slot = Complex::new(sample * window[i], 0.0);
        }

        fft.process(&mut buffer);

        frames.push(buffer[..n_bins].iter().map(|c| c.norm()).collect());
    }

    log::debug!(
        "STFT: {} samples -> {} frames x {} bins (frame={}, hop={})",
        samples.len(),
        n_frames,
        n_bins,
        frame_size,
        hop_size
    );

    Ok(frames)
}
