//! Configuration parameters for audio analysis

use crate::features::chroma::ChromaConfig;
use crate::preprocessing::normalization::NormalizationMethod;

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Preprocessing
    /// Rate the waveform is resampled to before analysis (default: Some(22050))
    ///
    /// `None` analyzes at the input rate.
    pub target_sample_rate: Option<u32>,

    /// Amplitude normalization applied before feature extraction (default: Some(Peak))
    pub normalization: Option<NormalizationMethod>,

    // STFT parameters
    /// Frame size for the onset-strength STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size shared by every frame-based feature (default: 512)
    pub hop_size: usize,

    // Chroma projection
    /// Frame size for the chroma STFT (default: 4096)
    ///
    /// Longer than `frame_size` so that adjacent semitones in the low register
    /// fall into distinct FFT bins.
    pub chroma_frame_size: usize,

    /// Lowest MIDI note included in the chroma projection (default: 24, C1)
    pub chroma_min_midi: u8,

    /// Number of octaves in the full chroma projection (default: 7)
    pub chroma_octaves: u8,

    /// Number of octaves in the reduced bass projection (default: 3, C1-B3)
    pub bass_octaves: u8,

    // Beat tracking
    /// Minimum BPM to consider (default: 60.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 180.0)
    pub max_bpm: f32,

    /// Centre of the log-normal tempo prior (default: 120.0)
    pub start_bpm: f32,

    /// How strongly beat spacing is held to the estimated period (default: 100.0)
    pub beat_tightness: f32,
}

impl AnalysisConfig {
    /// Chroma parameters for the full-range pitch-class projection
    pub fn chroma_config(&self) -> ChromaConfig {
        ChromaConfig {
            frame_size: self.chroma_frame_size,
            hop_size: self.hop_size,
            min_midi: self.chroma_min_midi,
            n_octaves: self.chroma_octaves,
        }
    }

    /// Chroma parameters for the reduced-octave projection used by bass detection
    pub fn bass_chroma_config(&self) -> ChromaConfig {
        ChromaConfig {
            n_octaves: self.bass_octaves,
            ..self.chroma_config()
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: Some(22050),
            normalization: Some(NormalizationMethod::Peak),
            frame_size: 2048,
            hop_size: 512,
            chroma_frame_size: 4096,
            chroma_min_midi: 24,
            chroma_octaves: 7,
            bass_octaves: 3,
            min_bpm: 60.0,
            max_bpm: 180.0,
            start_bpm: 120.0,
            beat_tightness: 100.0,
        }
    }
}
