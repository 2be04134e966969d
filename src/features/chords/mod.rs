//! Chord recognition modules
//!
//! Label each bar with one chord:
//! - Chord identity types (root + quality, or no chord)
//! - Weighted chord template bank (12 roots x 5 qualities)
//! - Bass-note hint from a reduced-octave chroma projection
//! - Bar segmentation and template matching

pub mod bass;
pub mod labeler;
pub mod templates;

pub use bass::detect_bass;
pub use labeler::{label_bars, link_neighbors};
pub use templates::{ChordTemplate, ChordTemplateBank};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::result::PitchClass;

/// Label used for bars without a usable chord
pub const NO_CHORD: &str = "N.C.";

/// Chord quality in the template dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    /// Major triad
    Major,
    /// Minor triad
    Minor,
    /// Dominant seventh
    Dominant7,
    /// Minor seventh
    Minor7,
    /// Major seventh
    Major7,
}

impl ChordQuality {
    /// All qualities in template iteration order
    pub const ALL: [ChordQuality; 5] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Dominant7,
        ChordQuality::Minor7,
        ChordQuality::Major7,
    ];

    /// Label suffix appended to the root name ("" for major)
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Major7 => "maj7",
        }
    }

    /// Chord tones as (semitones above the root, salience weight)
    pub fn intervals(self) -> &'static [(usize, f32)] {
        match self {
            ChordQuality::Major => &[(0, 1.0), (4, 0.95), (7, 0.9)],
            ChordQuality::Minor => &[(0, 1.0), (3, 0.95), (7, 0.9)],
            ChordQuality::Dominant7 => &[(0, 1.0), (4, 0.85), (7, 0.8), (10, 0.7)],
            ChordQuality::Minor7 => &[(0, 1.0), (3, 0.85), (7, 0.8), (10, 0.7)],
            ChordQuality::Major7 => &[(0, 1.0), (4, 0.85), (7, 0.8), (11, 0.7)],
        }
    }
}

/// A chord identified by root and quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    /// Root pitch class
    pub root: PitchClass,

    /// Chord quality
    pub quality: ChordQuality,
}

impl Chord {
    /// Create a chord from its root and quality
    pub fn new(root: PitchClass, quality: ChordQuality) -> Self {
        Self { root, quality }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root.name(), self.quality.suffix())
    }
}

impl FromStr for Chord {
    type Err = String;

    /// Parse a label such as "C#m7" (sharps only, exact suffix match)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchClass::ALL
            .iter()
            .flat_map(|&root| {
                ChordQuality::ALL
                    .iter()
                    .map(move |&quality| Chord::new(root, quality))
            })
            .find(|chord| chord.to_string() == s)
            .ok_or_else(|| format!("Unknown chord label: {:?}", s))
    }
}

/// Chord assigned to a bar: a recognized chord or "no chord"
///
/// Serializes as its display string (`"Am"`, `"G7"`, `"N.C."`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ChordLabel {
    /// No chord could be determined (degenerate or silent segment)
    NoChord,
    /// A recognized chord
    Chord(Chord),
}

impl ChordLabel {
    /// The chord, if any
    pub fn chord(&self) -> Option<Chord> {
        match self {
            ChordLabel::NoChord => None,
            ChordLabel::Chord(chord) => Some(*chord),
        }
    }
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordLabel::NoChord => f.write_str(NO_CHORD),
            ChordLabel::Chord(chord) => write!(f, "{}", chord),
        }
    }
}

impl FromStr for ChordLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NO_CHORD {
            Ok(ChordLabel::NoChord)
        } else {
            s.parse().map(ChordLabel::Chord)
        }
    }
}

impl From<ChordLabel> for String {
    fn from(label: ChordLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for ChordLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Chord> for ChordLabel {
    fn from(chord: Chord) -> Self {
        ChordLabel::Chord(chord)
    }
}
