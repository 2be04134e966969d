//! Analysis result types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisMetadata;
use crate::features::chords::ChordLabel;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One of the 12 equal-tempered pitch classes (0 = C, 1 = C#, ..., 11 = B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    /// All pitch classes in ascending order starting at C
    pub const ALL: [PitchClass; 12] = [
        PitchClass(0),
        PitchClass(1),
        PitchClass(2),
        PitchClass(3),
        PitchClass(4),
        PitchClass(5),
        PitchClass(6),
        PitchClass(7),
        PitchClass(8),
        PitchClass(9),
        PitchClass(10),
        PitchClass(11),
    ];

    /// Pitch class for a semitone index, wrapped into 0..12
    pub fn new(index: usize) -> Self {
        Self((index % 12) as u8)
    }

    /// Semitone index (0..12)
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Pitch class `semitones` above this one
    pub fn transpose(self, semitones: usize) -> Self {
        Self::new(self.index() + semitones)
    }

    /// Note name, always spelled with sharps (e.g., "C#", never "Db")
    ///
    /// # Example
    ///
    /// ```
    /// use chordmaster_dsp::analysis::result::PitchClass;
    ///
    /// assert_eq!(PitchClass::new(0).name(), "C");
    /// assert_eq!(PitchClass::new(10).name(), "A#");
    /// ```
    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.index()]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NOTE_NAMES
            .iter()
            .position(|&name| name == s)
            .map(PitchClass::new)
            .ok_or_else(|| format!("Unknown pitch class: {:?}", s))
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> Self {
        pc.0
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 12 {
            Ok(PitchClass(value))
        } else {
            Err(format!("Pitch class index out of range: {}", value))
        }
    }
}

/// Tonal mode of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

impl Mode {
    /// Lowercase name as used in serialized output ("major" / "minor")
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key rooted on the given pitch class
    Major(PitchClass),
    /// Minor key rooted on the given pitch class
    Minor(PitchClass),
}

impl Key {
    /// Tonal center
    pub fn root(&self) -> PitchClass {
        match self {
            Key::Major(pc) | Key::Minor(pc) => *pc,
        }
    }

    /// Major or minor
    pub fn mode(&self) -> Mode {
        match self {
            Key::Major(_) => Mode::Major,
            Key::Minor(_) => Mode::Minor,
        }
    }

    /// Get key name in musical notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use chordmaster_dsp::analysis::result::{Key, PitchClass};
    ///
    /// assert_eq!(Key::Major(PitchClass::new(6)).name(), "F#");
    /// assert_eq!(Key::Minor(PitchClass::new(9)).name(), "Am");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Key::Major(pc) => pc.name().to_string(),
            Key::Minor(pc) => format!("{}m", pc.name()),
        }
    }
}

/// One measure of the chord chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 1-based, contiguous bar number
    pub index: usize,

    /// Start time in seconds (the bar's first beat)
    pub start_time: f32,

    /// End time in seconds (next bar's start, or the waveform duration for the last bar)
    pub end_time: f32,

    /// Chord heard over this bar
    pub chord: ChordLabel,

    /// Chord of the preceding bar (absent for the first bar)
    pub previous_chord: Option<ChordLabel>,

    /// Chord of the following bar (absent for the last bar)
    pub next_chord: Option<ChordLabel>,
}

/// Analysis flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisFlag {
    /// Key scores were nearly tied (atonal or ambiguous material)
    WeakTonality,
    /// Too few beats (or no accent structure) for meter estimation; 4/4 assumed
    MeterFallback,
    /// The beat tracker found no beats, so no bars were produced
    NoBeatsDetected,
}

/// Complete analysis result
///
/// Immutable once returned; two runs over the same waveform produce equal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tempo estimate in BPM (0.0 when no periodicity was found)
    pub tempo_bpm: f32,

    /// Tonal center
    pub key_root: PitchClass,

    /// Major or minor
    pub mode: Mode,

    /// Winning key score (dot product with the unit reference profile)
    pub key_confidence: f32,

    /// Key clarity (0.0-1.0): relative margin between the two best key scores
    pub key_clarity: f32,

    /// Beats per bar, always 3 or 4
    pub beats_per_bar: u32,

    /// Beat timeline used for bar segmentation (seconds)
    pub beats: Vec<f32>,

    /// Bar-aligned chord progression
    pub bars: Vec<Bar>,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Detected key as a single value
    pub fn key(&self) -> Key {
        match self.mode {
            Mode::Major => Key::Major(self.key_root),
            Mode::Minor => Key::Minor(self.key_root),
        }
    }
}
