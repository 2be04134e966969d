//! Chroma extraction modules
//!
//! Project a waveform onto the 12 pitch classes:
//! - Chroma matrix computation (full range and reduced bass range)
//! - Normalization strategies

pub mod extractor;
pub mod normalization;

pub use extractor::extract_chroma;

use std::ops::Range;

/// Number of pitch classes per chroma column
pub const N_CHROMA: usize = 12;

/// Parameters of a pitch-class projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromaConfig {
    /// STFT frame size in samples
    pub frame_size: usize,

    /// Hop size in samples
    pub hop_size: usize,

    /// Lowest MIDI note included
    pub min_midi: u8,

    /// Number of octaves included above `min_midi`
    pub n_octaves: u8,
}

/// 12 x F grid of non-negative pitch-class energies
///
/// Stored column-major: one `[f32; 12]` per analysis frame. Column `t` covers
/// the time `t * hop_size / sample_rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaMatrix {
    frames: Vec<[f32; N_CHROMA]>,
    hop_size: usize,
    sample_rate: u32,
}

impl ChromaMatrix {
    /// Wrap pre-computed chroma columns
    pub fn new(frames: Vec<[f32; N_CHROMA]>, hop_size: usize, sample_rate: u32) -> Self {
        Self {
            frames,
            hop_size,
            sample_rate,
        }
    }

    /// Number of columns
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// True if there are no columns
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All columns in time order
    pub fn frames(&self) -> &[[f32; N_CHROMA]] {
        &self.frames
    }

    /// Hop size in samples
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Sample rate the matrix was computed at
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Time in seconds of column `frame`
    pub fn frame_to_time(&self, frame: usize) -> f32 {
        frame as f32 * self.hop_size as f32 / self.sample_rate as f32
    }

    /// Column index containing `time` (floor); negative times map to 0
    pub fn time_to_frame(&self, time: f32) -> usize {
        if time <= 0.0 || self.hop_size == 0 {
            return 0;
        }
        (time * self.sample_rate as f32 / self.hop_size as f32).floor() as usize
    }

    /// Column range covering `[start_time, end_time)`, clipped to the matrix
    ///
    /// Returns `None` when the range is empty or starts past the last column.
    pub fn frame_range(&self, start_time: f32, end_time: f32) -> Option<Range<usize>> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return None;
        }
        let start = self.time_to_frame(start_time);
        let end = self.time_to_frame(end_time).min(self.n_frames());
        if start >= end {
            None
        } else {
            Some(start..end)
        }
    }

    /// Mean column over `range` (all zeros for an empty range)
    pub fn mean_over(&self, range: Range<usize>) -> [f32; N_CHROMA] {
        let end = range.end.min(self.frames.len());
        let start = range.start.min(end);
        let slice = &self.frames[start..end];

        let mut mean = [0.0f32; N_CHROMA];
        if slice.is_empty() {
            return mean;
        }
        for column in slice {
            for (acc, &v) in mean.iter_mut().zip(column.iter()) {
                *acc += v;
            }
        }
        let n = slice.len() as f32;
        for v in &mut mean {
            *v /= n;
        }
        mean
    }

    /// Mean column over the whole matrix
    pub fn mean(&self) -> [f32; N_CHROMA] {
        self.mean_over(0..self.frames.len())
    }
}
