//! Key detection algorithm
//!
//! Matches the average chroma distribution against Krumhansl-Kessler templates
//! to detect the musical key of an audio track.
//!
//! # Algorithm
//!
//! 1. Average chroma across all frames and L1-normalize (epsilon-guarded)
//! 2. Dot product with each of the 24 unit-norm key templates
//! 3. Best root per mode (first root wins ties), then major if its best score
//!    is at least the minor best
//!
//! Silent input never fails: all scores are 0 and the result is C major with
//! confidence 0.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use super::{compute_key_clarity, templates::KeyTemplates, KeyDetectionResult};
use crate::analysis::result::{Key, PitchClass};
use crate::features::chroma::normalization::{dot, l1_normalize};
use crate::features::chroma::{ChromaMatrix, N_CHROMA};

/// Detect musical key from a chroma matrix
///
/// # Arguments
///
/// * `chroma` - Full-range chroma matrix
///
/// # Returns
///
/// Key detection result with:
/// - Detected key (major or minor, 0-11)
/// - Confidence score (the winning dot product)
/// - Key clarity
/// - All 24 key scores (ranked)
///
/// # Example
///
/// ```no_run
/// use chordmaster_dsp::features::chroma::{extract_chroma, ChromaConfig};
/// use chordmaster_dsp::features::key::estimate_key;
///
/// let samples = vec![0.0f32; 22050 * 5];
/// let config = ChromaConfig { frame_size: 4096, hop_size: 512, min_midi: 24, n_octaves: 7 };
/// let chroma = extract_chroma(&samples, 22050, &config)?;
/// let result = estimate_key(&chroma);
///
/// println!("Detected key: {}, confidence: {:.2}", result.key.name(), result.confidence);
/// # Ok::<(), chordmaster_dsp::AnalysisError>(())
/// ```
pub fn estimate_key(chroma: &ChromaMatrix) -> KeyDetectionResult {
    log::debug!("Detecting key from {} chroma frames", chroma.n_frames());
    estimate_key_from_profile(&chroma.mean(), KeyTemplates::shared())
}

/// Detect musical key from an aggregate 12-bin pitch-class profile
pub fn estimate_key_from_profile(
    profile: &[f32; N_CHROMA],
    templates: &KeyTemplates,
) -> KeyDetectionResult {
    let normalized = l1_normalize(profile);

    let major_scores: Vec<f32> = templates.major.iter().map(|t| dot(&normalized, t)).collect();
    let minor_scores: Vec<f32> = templates.minor.iter().map(|t| dot(&normalized, t)).collect();

    let best_major = first_argmax(&major_scores);
    let best_minor = first_argmax(&minor_scores);

    let (key, confidence) = if major_scores[best_major] >= minor_scores[best_minor] {
        (Key::Major(PitchClass::new(best_major)), major_scores[best_major])
    } else {
        (Key::Minor(PitchClass::new(best_minor)), minor_scores[best_minor])
    };

    let mut all_scores: Vec<(Key, f32)> = Vec::with_capacity(24);
    for root in 0..12 {
        all_scores.push((Key::Major(PitchClass::new(root)), major_scores[root]));
    }
    for root in 0..12 {
        all_scores.push((Key::Minor(PitchClass::new(root)), minor_scores[root]));
    }
    // Stable sort: equal scores keep major-first, root-ascending order
    all_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    // The winner leads the ranking even if a float tie put another key first
    if let Some(pos) = all_scores.iter().position(|(k, _)| *k == key) {
        let winner = all_scores.remove(pos);
        all_scores.insert(0, winner);
    }

    let clarity = compute_key_clarity(&all_scores);

    log::debug!(
        "Key: {} (score={:.4}, clarity={:.3})",
        key.name(),
        confidence,
        clarity
    );

    KeyDetectionResult {
        key,
        confidence,
        clarity,
        all_scores,
    }
}

/// Index of the first maximum (strict `>`)
fn first_argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
