//! Krumhansl-Kessler key templates
//!
//! Defines tonal profiles for 24 keys (12 major + 12 minor). Each profile is
//! scaled to unit L2 norm, so a chroma vector proportional to one of them
//! scores strictly highest against that key.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use std::sync::OnceLock;

use crate::analysis::result::{Key, PitchClass};
use crate::features::chroma::normalization::l2_normalize;
use crate::features::chroma::N_CHROMA;

/// Probe-tone ratings for a major key rooted on C
pub const MAJOR_PROFILE: [f32; N_CHROMA] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Probe-tone ratings for a minor key rooted on C
pub const MINOR_PROFILE: [f32; N_CHROMA] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

static SHARED: OnceLock<KeyTemplates> = OnceLock::new();

/// Key templates for all 24 keys
#[derive(Debug, Clone)]
pub struct KeyTemplates {
    /// Major key templates (12 keys: C, C#, D, ..., B)
    pub major: [[f32; N_CHROMA]; 12],

    /// Minor key templates (12 keys: C, C#, D, ..., B)
    pub minor: [[f32; N_CHROMA]; 12],
}

impl KeyTemplates {
    /// Create new key templates with Krumhansl-Kessler profiles
    pub fn new() -> Self {
        let major_unit = l2_normalize(&MAJOR_PROFILE);
        let minor_unit = l2_normalize(&MINOR_PROFILE);

        let mut major = [[0.0f32; N_CHROMA]; 12];
        let mut minor = [[0.0f32; N_CHROMA]; 12];
        for root in 0..12 {
            major[root] = rotate(&major_unit, root);
            minor[root] = rotate(&minor_unit, root);
        }

        Self { major, minor }
    }

    /// Process-wide templates, built on first use
    pub fn shared() -> &'static KeyTemplates {
        SHARED.get_or_init(KeyTemplates::new)
    }

    /// Template for `key`
    pub fn template(&self, key: Key) -> &[f32; N_CHROMA] {
        match key {
            Key::Major(root) => &self.major[root.index()],
            Key::Minor(root) => &self.minor[root.index()],
        }
    }

    /// Major template rooted on `root`
    pub fn major(&self, root: PitchClass) -> &[f32; N_CHROMA] {
        &self.major[root.index()]
    }

    /// Minor template rooted on `root`
    pub fn minor(&self, root: PitchClass) -> &[f32; N_CHROMA] {
        &self.minor[root.index()]
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

/// Circularly shift a C-rooted profile so its tonic lands on `root`
fn rotate(profile: &[f32; N_CHROMA], root: usize) -> [f32; N_CHROMA] {
    let mut rotated = [0.0f32; N_CHROMA];
    for (i, &v) in profile.iter().enumerate() {
        rotated[(i + root) % N_CHROMA] = v;
    }
    rotated
}
