//! Sample-rate conversion
//!
//! Band-limited sinc resampling with `rubato`. The whole waveform is processed
//! as one chunk, the filter delay is trimmed from the front, and the output is
//! cut or zero-padded to `round(len * target / source)` samples so beat times
//! in seconds line up on both timelines.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AnalysisError;

/// Sinc filter length in taps
const SINC_LEN: usize = 256;

/// Resample `samples` from `source_rate` to `target_rate`
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if either rate is 0, and
/// `AnalysisError::ProcessingError` if the resampler rejects the conversion.
///
/// # Example
///
/// ```no_run
/// use chordmaster_dsp::preprocessing::resample::resample;
///
/// let samples = vec![0.0f32; 44100];
/// let resampled = resample(&samples, 44100, 22050)?;
/// assert_eq!(resampled.len(), 22050);
/// # Ok::<(), chordmaster_dsp::AnalysisError>(())
/// ```
pub fn resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AnalysisError> {
    if source_rate == 0 || target_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid resampling rates: {} -> {}",
            source_rate, target_rate
        )));
    }
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = ((samples.len() as f64 * ratio).round() as usize).max(1);

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz ({} samples)",
        samples.len(),
        source_rate,
        target_rate,
        out_len
    );

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    // Trailing silence flushes the filter tail so the delay trim leaves a full signal
    let mut padded = Vec::with_capacity(samples.len() + 2 * SINC_LEN);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + 2 * SINC_LEN, 0.0);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, padded.len(), 1)
        .map_err(|e| AnalysisError::ProcessingError(format!("Resampler setup failed: {}", e)))?;
    let delay = resampler.output_delay();

    let waves_out = resampler
        .process(&[padded], None)
        .map_err(|e| AnalysisError::ProcessingError(format!("Resampling failed: {}", e)))?;

    let mut out: Vec<f32> = waves_out
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .skip(delay)
        .take(out_len)
        .collect();
    if out.len() < out_len {
        log::debug!("Resampler came up {} samples short; padding", out_len - out.len());
        out.resize(out_len, 0.0);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, seconds: f32) -> Vec<f32> {
        let n = (rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    /// RMS of the middle half, away from the filter's edge transients
    fn middle_rms(samples: &[f32]) -> f32 {
        let mid = &samples[samples.len() / 4..3 * samples.len() / 4];
        (mid.iter().map(|v| v * v).sum::<f32>() / mid.len() as f32).sqrt()
    }

    #[test]
    fn test_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 22050, 22050).unwrap(), samples);
    }

    #[test]
    fn test_downsample_length_and_pitch() {
        let samples = sine(440.0, 44100, 1.0);
        let out = resample(&samples, 44100, 22050).unwrap();
        assert_eq!(out.len(), 22050);
        // 440 Hz over one second: ~880 zero crossings at any rate
        let crossings = zero_crossings(&out) as i64;
        assert!((crossings - 880).abs() <= 4, "{} crossings", crossings);
    }

    #[test]
    fn test_passband_level_preserved() {
        let out = resample(&sine(1000.0, 48000, 1.0), 48000, 22050).unwrap();
        let rms = middle_rms(&out);
        assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "rms {}", rms);
    }

    #[test]
    fn test_content_above_new_nyquist_is_removed() {
        // 20 kHz would fold to 2.05 kHz, inside the chroma range
        let out = resample(&sine(20000.0, 48000, 1.0), 48000, 22050).unwrap();
        assert_eq!(out.len(), 22050);
        let rms = middle_rms(&out);
        assert!(rms < 0.02, "aliased rms {}", rms);
    }

    #[test]
    fn test_output_is_not_delayed() {
        // A step at 0.5 s must still be at ~0.5 s after conversion
        let mut samples = vec![0.0f32; 44100];
        samples[22050..].iter_mut().for_each(|v| *v = 0.5);
        let out = resample(&samples, 44100, 22050).unwrap();
        let rise = out.iter().position(|&v| v > 0.25).unwrap();
        assert!((rise as i64 - 11025).abs() <= 3, "step at {}", rise);
    }

    #[test]
    fn test_upsample_length() {
        let samples = sine(220.0, 16000, 0.5);
        let out = resample(&samples, 16000, 22050).unwrap();
        assert_eq!(out.len(), (8000.0f64 * 22050.0 / 16000.0).round() as usize);
        let rms = middle_rms(&out);
        assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "rms {}", rms);
    }

    #[test]
    fn test_odd_length_rounds() {
        let out = resample(&vec![0.0f32; 88201], 44100, 22050).unwrap();
        assert_eq!(out.len(), (88201.0f64 / 2.0).round() as usize);
    }

    #[test]
    fn test_invalid_rates() {
        assert!(resample(&[0.0; 4], 0, 22050).is_err());
        assert!(resample(&[0.0; 4], 44100, 0).is_err());
    }
}
