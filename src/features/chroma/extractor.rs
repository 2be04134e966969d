//! Chroma matrix extraction
//!
//! Projects an STFT power spectrogram onto the 12 pitch classes. Every FFT bin
//! is assigned to its nearest equal-tempered note (A4 = 440 Hz); bins whose note
//! falls outside `[min_midi, min_midi + 12 * n_octaves)` are ignored, which is
//! how the reduced-octave bass projection emphasizes the low register. Each
//! column is scaled so its strongest pitch class is 1.
//!
//! # Example
//!
//! ```no_run
//! use chordmaster_dsp::features::chroma::{extract_chroma, ChromaConfig};
//!
//! let samples = vec![0.0f32; 22050 * 5];
//! let config = ChromaConfig { frame_size: 4096, hop_size: 512, min_midi: 24, n_octaves: 7 };
//! let chroma = extract_chroma(&samples, 22050, &config)?;
//! println!("{} chroma frames", chroma.n_frames());
//! # Ok::<(), chordmaster_dsp::AnalysisError>(())
//! ```

use super::normalization::max_normalize_in_place;
use super::{ChromaConfig, ChromaMatrix, N_CHROMA};
use crate::error::AnalysisError;
use crate::features::spectrum::magnitude_spectrogram;

/// Reference tuning for A4 in Hz
const A4_FREQUENCY: f32 = 440.0;

/// Extract a chroma matrix from audio samples
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Frame/hop sizes and the MIDI range to project
///
/// # Returns
///
/// Chroma matrix with one column per STFT frame (empty for empty input)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate, zero frame/hop
/// size, or an empty octave range.
pub fn extract_chroma(
    samples: &[f32],
    sample_rate: u32,
    config: &ChromaConfig,
) -> Result<ChromaMatrix, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }
    if config.n_octaves == 0 {
        return Err(AnalysisError::InvalidInput(
            "Chroma projection needs at least one octave".to_string(),
        ));
    }

    log::debug!(
        "Extracting chroma: {} samples at {} Hz, MIDI {}..{}",
        samples.len(),
        sample_rate,
        config.min_midi,
        config.min_midi as u32 + 12 * config.n_octaves as u32
    );

    let spectrogram = magnitude_spectrogram(samples, config.frame_size, config.hop_size)?;
    let bin_map = pitch_class_map(config.frame_size, sample_rate, config);

    let frames: Vec<[f32; N_CHROMA]> = spectrogram
        .iter()
        .map(|frame| {
            let mut chroma = [0.0f32; N_CHROMA];
            for (magnitude, pitch_class) in frame.iter().zip(bin_map.iter()) {
                if let Some(pc) = pitch_class {
                    chroma[*pc] += magnitude * magnitude;
                }
            }
            max_normalize_in_place(&mut chroma);
            chroma
        })
        .collect();

    Ok(ChromaMatrix::new(frames, config.hop_size, sample_rate))
}

/// Map each FFT bin to a pitch class, or `None` when it falls outside the range
fn pitch_class_map(
    frame_size: usize,
    sample_rate: u32,
    config: &ChromaConfig,
) -> Vec<Option<usize>> {
    let n_bins = frame_size / 2 + 1;
    let min_midi = config.min_midi as i32;
    let max_midi = min_midi + 12 * config.n_octaves as i32;

    (0..n_bins)
        .map(|bin| {
            let freq = bin as f32 * sample_rate as f32 / frame_size as f32;
            let midi = frequency_to_midi(freq)?;
            if midi >= min_midi && midi < max_midi {
                Some(midi.rem_euclid(12) as usize)
            } else {
                None
            }
        })
        .collect()
}

/// Nearest MIDI note number for a frequency (None for DC)
fn frequency_to_midi(freq: f32) -> Option<i32> {
    if freq <= 0.0 {
        return None;
    }
    Some((69.0 + 12.0 * (freq / A4_FREQUENCY).log2()).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_mix(freqs: &[f32], sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs
                    .iter()
                    .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
                    / freqs.len() as f32
            })
            .collect()
    }

    fn full_config() -> ChromaConfig {
        ChromaConfig {
            frame_size: 4096,
            hop_size: 512,
            min_midi: 24,
            n_octaves: 7,
        }
    }

    fn argmax(v: &[f32; N_CHROMA]) -> usize {
        let mut best = 0;
        for i in 1..N_CHROMA {
            if v[i] > v[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_frequency_to_midi() {
        assert_eq!(frequency_to_midi(440.0), Some(69));
        assert_eq!(frequency_to_midi(261.63), Some(60));
        assert_eq!(frequency_to_midi(32.70), Some(24));
        assert_eq!(frequency_to_midi(0.0), None);
    }

    #[test]
    fn test_extract_chroma_single_note() {
        let samples = sine_mix(&[220.0], 22050, 1.0);
        let chroma = extract_chroma(&samples, 22050, &full_config()).unwrap();

        assert!(!chroma.is_empty());
        assert_eq!(argmax(&chroma.mean()), 9); // A
    }

    #[test]
    fn test_extract_chroma_columns_bounded() {
        let samples = sine_mix(&[220.0, 261.63, 329.63], 22050, 1.0);
        let chroma = extract_chroma(&samples, 22050, &full_config()).unwrap();

        for column in chroma.frames() {
            assert!(column.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }

        let mean = chroma.mean();
        let mut ranked: Vec<usize> = (0..N_CHROMA).collect();
        ranked.sort_by(|&a, &b| mean[b].partial_cmp(&mean[a]).unwrap());
        let mut top3 = ranked[..3].to_vec();
        top3.sort();
        assert_eq!(top3, vec![0, 4, 9]); // C, E, A
    }

    #[test]
    fn test_bass_range_excludes_upper_notes() {
        // C5 (523 Hz) lies above a three-octave projection starting at C1; A2 does not
        let samples = sine_mix(&[110.0, 523.25], 22050, 1.0);
        let bass = ChromaConfig {
            n_octaves: 3,
            ..full_config()
        };
        let chroma = extract_chroma(&samples, 22050, &bass).unwrap();
        let mean = chroma.mean();
        assert_eq!(argmax(&mean), 9);
        assert!(mean[0] < 0.01);
    }

    #[test]
    fn test_extract_chroma_silence_is_zero() {
        let chroma = extract_chroma(&vec![0.0; 8192], 22050, &full_config()).unwrap();
        assert!(chroma.frames().iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_extract_chroma_invalid() {
        assert!(extract_chroma(&[0.0; 10], 0, &full_config()).is_err());
        let no_octaves = ChromaConfig {
            n_octaves: 0,
            ..full_config()
        };
        assert!(extract_chroma(&[0.0; 10], 22050, &no_octaves).is_err());
        assert!(extract_chroma(&[], 22050, &full_config()).unwrap().is_empty());
    }
}
