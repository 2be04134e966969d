//! Chord template bank
//!
//! One unit-norm 12-bin pitch-class vector per (root, quality) pair. Chord
//! tones carry salience weights (root highest) placed at
//! `(root + semitone) mod 12`. The bank is input-independent: it is built once
//! per process and shared read-only.
//!
//! Iteration order is root-major, quality-minor (C, Cm, C7, Cm7, Cmaj7, C#, ...),
//! which fixes how ties between equal scores are resolved downstream.

use std::sync::OnceLock;

use super::{Chord, ChordQuality};
use crate::analysis::result::PitchClass;
use crate::features::chroma::normalization::l2_normalize;
use crate::features::chroma::N_CHROMA;

static SHARED: OnceLock<ChordTemplateBank> = OnceLock::new();

/// Reference vector for one chord
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTemplate {
    /// Chord identity
    pub chord: Chord,

    /// Unit-norm pitch-class weights
    pub vector: [f32; N_CHROMA],
}

impl ChordTemplate {
    /// Build the template for `root` and `quality`
    pub fn new(root: PitchClass, quality: ChordQuality) -> Self {
        let mut vector = [0.0f32; N_CHROMA];
        for &(semitone, weight) in quality.intervals() {
            vector[root.transpose(semitone).index()] = weight;
        }

        Self {
            chord: Chord::new(root, quality),
            vector: l2_normalize(&vector),
        }
    }

    /// Root pitch class of the chord
    pub fn root(&self) -> PitchClass {
        self.chord.root
    }
}

/// Ordered dictionary of chord templates
#[derive(Debug, Clone)]
pub struct ChordTemplateBank {
    templates: Vec<ChordTemplate>,
}

impl ChordTemplateBank {
    /// Build all 60 templates in root-major, quality-minor order
    pub fn new() -> Self {
        let templates: Vec<ChordTemplate> = PitchClass::ALL
            .iter()
            .flat_map(|&root| {
                ChordQuality::ALL
                    .iter()
                    .map(move |&quality| ChordTemplate::new(root, quality))
            })
            .collect();

        log::debug!("Built {} chord templates", templates.len());

        Self { templates }
    }

    /// Bank over a custom dictionary, iterated in the given order
    pub fn from_templates(templates: Vec<ChordTemplate>) -> Self {
        Self { templates }
    }

    /// Process-wide bank, built on first use
    pub fn shared() -> &'static ChordTemplateBank {
        SHARED.get_or_init(ChordTemplateBank::new)
    }

    /// Templates in iteration order
    pub fn iter(&self) -> std::slice::Iter<'_, ChordTemplate> {
        self.templates.iter()
    }

    /// Template for `chord`
    pub fn get(&self, chord: Chord) -> Option<&ChordTemplate> {
        self.templates.iter().find(|t| t.chord == chord)
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if the bank holds no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for ChordTemplateBank {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ChordTemplateBank {
    type Item = &'a ChordTemplate;
    type IntoIter = std::slice::Iter<'a, ChordTemplate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
