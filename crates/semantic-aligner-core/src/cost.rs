//! Pairing cost between two tokens.
//!
//! Cosine distance between embedding vectors when both sides carry a
//! token, the gap penalty otherwise.
//!
//! # Cost Table
//!
//! | left | right | cost |
//! |------|-------|------|
//! | gap | gap | `0.0` |
//! | gap | token | `gap_penalty` |
//! | token | gap | `gap_penalty` |
//! | token | token | `cosine_distance(u, v)`, or `gap_penalty` if a vector is missing |

use crate::embedding::EmbeddingLookup;

/// Cosine distance `1 - cos(θ)` between two vectors, in `[0.0, 2.0]`.
///
/// The similarity is clamped to `[-1.0, 1.0]` before subtracting. If either
/// vector has zero norm the pair is treated as maximally dissimilar and
/// `1.0` is returned.
///
/// ```text
///                a · b
/// d = 1 − ─────────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    1.0 - similarity
}

/// Cost of pairing `left` with `right`.
///
/// Never fails: a token without a vector in `lookup` costs the same as a gap.
pub fn pair_cost(
    left: Option<&str>,
    right: Option<&str>,
    lookup: &EmbeddingLookup,
    gap_penalty: f64,
) -> f64 {
    match (left, right) {
        (None, None) => 0.0,
        (None, Some(_)) | (Some(_), None) => gap_penalty,
        (Some(l), Some(r)) => match (lookup.get(l), lookup.get(r)) {
            (Some(u), Some(v)) => cosine_distance(u, v),
            _ => gap_penalty,
        },
    }
}
