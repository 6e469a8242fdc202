//! Dense-vector math shared by the gallery index.
//!
//! Portable scalar implementations; the gallery's scan index is bound by
//! memory traffic, not arithmetic, at the collection sizes it targets.
//!
//! Distance functions return `f32::INFINITY` for mismatched lengths so a
//! malformed pair is never selected as a nearest neighbor. Callers that
//! enforce a fixed dimension up front never observe this.

const NORM_EPSILON: f32 = 1e-10;

/// Dot product of two vectors.
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Squared L2 distance (faster when only comparing distances).
#[inline]
#[must_use]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    l2_distance_squared(a, b).sqrt()
}

/// Normalize a vector to unit L2 norm.
///
/// A vector with near-zero norm maps to the zero vector rather than
/// amplifying noise.
#[inline]
#[must_use]
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n < NORM_EPSILON {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / n).collect()
}
