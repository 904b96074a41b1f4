//! Overlapping fixed-size windows over two token sequences.
//!
//! Long inputs are cut into window pairs so that each DP table and each
//! embedding request stays bounded by `chunk_size`. Consecutive windows
//! share `overlap_size` positions, which is what the stitcher later uses to
//! reconcile neighbouring alignments.
//!
//! # Algorithm
//!
//! 1. `stride = chunk_size − overlap_size`, forced to `1` when that is ≤ 0.
//! 2. Windows start at `0, stride, 2·stride, …`; each takes
//!    `[start, start + chunk_size)` from both sequences independently,
//!    clamped to each sequence's length.
//! 3. Iteration stops after the first window whose end reaches
//!    `max(|left|, |right|)`, so at least one window is always produced.
//!
//! # Example
//!
//! ```rust
//! use semantic_aligner_core::window::windows;
//!
//! let left: Vec<Option<String>> = (0..6).map(|i| Some(i.to_string())).collect();
//! let right = left.clone();
//! let spans: Vec<usize> = windows(&left, &right, 4, 2)
//!     .unwrap()
//!     .map(|(l, _)| l.len())
//!     .collect();
//! assert_eq!(spans, vec![4, 4]);
//! ```

use crate::error::AlignError;
use crate::models::Token;

/// Upper bound on the default overlap.
pub const MAX_DEFAULT_OVERLAP: usize = 4;

/// Overlap used when chunking is requested without one: `min(4, chunk_size / 2)`.
pub fn default_overlap(chunk_size: usize) -> usize {
    MAX_DEFAULT_OVERLAP.min(chunk_size / 2)
}

/// Lazy iterator over `(left_slice, right_slice)` window pairs.
///
/// Created by [`windows`].
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    left: &'a [Token],
    right: &'a [Token],
    chunk_size: usize,
    stride: usize,
    limit: usize,
    start: usize,
    done: bool,
}

impl<'a> Windows<'a> {
    /// Distance between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl<'a> Iterator for Windows<'a> {
    type Item = (&'a [Token], &'a [Token]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.start;
        let end = start + self.chunk_size;
        let item = (
            clamp_slice(self.left, start, end),
            clamp_slice(self.right, start, end),
        );

        if end >= self.limit {
            self.done = true;
        } else {
            self.start += self.stride;
        }
        Some(item)
    }
}

fn clamp_slice(seq: &[Token], start: usize, end: usize) -> &[Token] {
    let len = seq.len();
    &seq[start.min(len)..end.min(len)]
}

/// Split two sequences into overlapping window pairs.
///
/// # Errors
///
/// Returns [`AlignError::InvalidChunkSize`] when `chunk_size` is `0`.
pub fn windows<'a>(
    left: &'a [Token],
    right: &'a [Token],
    chunk_size: usize,
    overlap_size: usize,
) -> Result<Windows<'a>, AlignError> {
    if chunk_size == 0 {
        return Err(AlignError::InvalidChunkSize(chunk_size));
    }

    let stride = chunk_size.saturating_sub(overlap_size).max(1);

    Ok(Windows {
        left,
        right,
        chunk_size,
        stride,
        limit: left.len().max(right.len()),
        start: 0,
        done: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(prefix: &str, n: usize) -> Vec<Token> {
        (0..n).map(|i| Some(format!("{prefix}{i}"))).collect()
    }

    fn starts(w: &[(&[Token], &[Token])]) -> Vec<Option<String>> {
        w.iter().map(|(l, _)| l.first().cloned().flatten()).collect()
    }

    #[test]
    fn test_overlapping_windows() {
        let left = seq("l", 10);
        let right = seq("r", 10);
        let w: Vec<_> = windows(&left, &right, 4, 2).unwrap().collect();

        assert_eq!(w.len(), 4);
        assert_eq!(
            starts(&w),
            vec![
                Some("l0".to_string()),
                Some("l2".to_string()),
                Some("l4".to_string()),
                Some("l6".to_string()),
            ]
        );
        assert!(w.iter().all(|(l, r)| l.len() == 4 && r.len() == 4));
    }

    #[test]
    fn test_uneven_lengths_clamp_independently() {
        let left = seq("l", 3);
        let right = seq("r", 7);
        let w: Vec<_> = windows(&left, &right, 4, 1).unwrap().collect();

        // stride 3: [0,4) and [3,7)
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].0.len(), 3);
        assert_eq!(w[0].1.len(), 4);
        assert!(w[1].0.is_empty());
        assert_eq!(w[1].1.len(), 4);
    }

    #[test]
    fn test_empty_inputs_yield_one_empty_window() {
        let w: Vec<_> = windows(&[], &[], 4, 2).unwrap().collect();
        assert_eq!(w.len(), 1);
        assert!(w[0].0.is_empty() && w[0].1.is_empty());
    }

    #[test]
    fn test_short_input_single_window() {
        let left = seq("l", 3);
        let w: Vec<_> = windows(&left, &left, 8, 2).unwrap().collect();
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].0.len(), 3);
    }

    #[test]
    fn test_overlap_not_smaller_than_chunk_forces_stride_one() {
        let left = seq("l", 5);
        let iter = windows(&left, &left, 3, 3).unwrap();
        assert_eq!(iter.stride(), 1);
        // starts 0, 1, 2 (end 5 reaches the limit)
        assert_eq!(iter.count(), 3);

        assert_eq!(windows(&left, &left, 3, 10).unwrap().stride(), 1);
    }

    #[test]
    fn test_zero_overlap_partitions() {
        let left = seq("l", 6);
        let w: Vec<_> = windows(&left, &left, 2, 0).unwrap().collect();
        let total: usize = w.iter().map(|(l, _)| l.len()).sum();
        assert_eq!(w.len(), 3);
        assert_eq!(total, 6);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = windows(&[], &[], 0, 0).unwrap_err();
        assert!(matches!(err, AlignError::InvalidChunkSize(0)));
    }

    #[test]
    fn test_default_overlap() {
        assert_eq!(default_overlap(1), 0);
        assert_eq!(default_overlap(4), 2);
        assert_eq!(default_overlap(7), 3);
        assert_eq!(default_overlap(20), 4);
    }
}
