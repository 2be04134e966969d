//! Key clarity scoring
//!
//! Estimates how "tonal" vs "atonal" a track is from the margin between the
//! best and second-best key scores.

use crate::analysis::result::Key;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Compute key clarity from key scores
///
/// # Arguments
///
/// * `scores` - All 24 key scores (ranked, highest first)
///
/// # Returns
///
/// Clarity score `(best - second) / best` in 0.0-1.0, higher = more tonal.
/// Returns 0.0 when fewer than two scores are given or the best score is not
/// positive.
pub fn compute_key_clarity(scores: &[(Key, f32)]) -> f32 {
    log::debug!("Computing key clarity from {} scores", scores.len());

    if scores.len() < 2 {
        return 0.0;
    }

    let best = scores[0].1;
    let second = scores[1].1;
    if best <= EPSILON {
        return 0.0;
    }

    ((best - second) / best).clamp(0.0, 1.0)
}
