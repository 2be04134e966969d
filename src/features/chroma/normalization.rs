//! Chroma normalization strategies

use super::N_CHROMA;

/// Numerical stability epsilon
pub const EPSILON: f32 = 1e-10;

/// Scale a chroma vector so its entries sum to 1
///
/// Divides by `sum + EPSILON`, so an all-zero vector stays all-zero instead of
/// producing NaN.
pub fn l1_normalize(chroma: &[f32; N_CHROMA]) -> [f32; N_CHROMA] {
    let sum: f32 = chroma.iter().sum();
    let mut out = *chroma;
    for v in &mut out {
        *v /= sum + EPSILON;
    }
    out
}

/// Scale a vector to unit Euclidean length
///
/// Vectors with zero norm are returned unchanged.
pub fn l2_normalize(vector: &[f32; N_CHROMA]) -> [f32; N_CHROMA] {
    let norm = l2_norm(vector);
    let mut out = *vector;
    if norm > 0.0 {
        for v in &mut out {
            *v /= norm;
        }
    }
    out
}

/// Euclidean norm
pub fn l2_norm(vector: &[f32; N_CHROMA]) -> f32 {
    vector.iter().map(|&x| x * x).sum::<f32>().sqrt()
}

/// Scale a chroma column so its largest entry is 1 (infinity norm)
///
/// Columns whose peak is below `EPSILON` are zeroed.
pub fn max_normalize_in_place(chroma: &mut [f32; N_CHROMA]) {
    let max = chroma.iter().copied().fold(0.0f32, f32::max);
    if max > EPSILON {
        for v in chroma.iter_mut() {
            *v /= max;
        }
    } else {
        *chroma = [0.0; N_CHROMA];
    }
}

/// Dot product of two 12-element vectors
pub fn dot(a: &[f32; N_CHROMA], b: &[f32; N_CHROMA]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
