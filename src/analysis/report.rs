//! Chord chart serialization boundary
//!
//! Converts an [`AnalysisResult`] into the flat, string-labelled structure handed
//! to API consumers: tempo rounded to 1 decimal, bar times rounded to 2 decimals,
//! sharp-only note names, `"N.C."` for bars without a chord, and camelCase
//! `prevChord`/`nextChord` links.

use serde::{Deserialize, Serialize};

use super::result::{AnalysisResult, Bar, Mode};

/// Serialized analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordChart {
    /// Tempo in BPM, rounded to 1 decimal place
    pub tempo_bpm: f32,

    /// Tonal center name (sharps only)
    pub key: String,

    /// "major" or "minor"
    pub mode: Mode,

    /// 3 or 4
    pub beats_per_bar: u32,

    /// One entry per bar
    pub bars: Vec<ChartBar>,
}

/// Serialized bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    /// 1-based bar number
    pub bar: usize,

    /// Start time in seconds, rounded to 2 decimals
    pub start_time: f32,

    /// End time in seconds, rounded to 2 decimals
    pub end_time: f32,

    /// Chord label, e.g. "Am", "G7", "N.C."
    pub chord: String,

    /// Previous bar's chord label
    #[serde(rename = "prevChord")]
    pub prev_chord: Option<String>,

    /// Next bar's chord label
    #[serde(rename = "nextChord")]
    pub next_chord: Option<String>,
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    (value * scale).round() / scale
}

impl From<&Bar> for ChartBar {
    fn from(bar: &Bar) -> Self {
        Self {
            bar: bar.index,
            start_time: round_to(bar.start_time, 2),
            end_time: round_to(bar.end_time, 2),
            chord: bar.chord.to_string(),
            prev_chord: bar.previous_chord.map(|c| c.to_string()),
            next_chord: bar.next_chord.map(|c| c.to_string()),
        }
    }
}

impl AnalysisResult {
    /// Build the serialized chord chart
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chordmaster_dsp::{analyze_audio, AnalysisConfig};
    ///
    /// let samples = vec![0.0f32; 22050 * 4];
    /// let chart = analyze_audio(&samples, 22050, AnalysisConfig::default())?.to_chart();
    /// println!("{} {} in {}/4", chart.key, chart.mode, chart.beats_per_bar);
    /// # Ok::<(), chordmaster_dsp::AnalysisError>(())
    /// ```
    pub fn to_chart(&self) -> ChordChart {
        ChordChart {
            tempo_bpm: round_to(self.tempo_bpm, 1),
            key: self.key_root.name().to_string(),
            mode: self.mode,
            beats_per_bar: self.beats_per_bar,
            bars: self.bars.iter().map(ChartBar::from).collect(),
        }
    }
}
