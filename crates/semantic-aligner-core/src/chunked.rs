//! Chunked alignment: window, align each window, stitch.
//!
//! This is the sequential reference path. The `semantic-aligner` app
//! dispatches windows concurrently and then folds them with the same
//! [`stitch_all`](crate::stitch::stitch_all).

use crate::align::{align, validate_gap_penalty};
use crate::embedding::EmbeddingProvider;
use crate::error::AlignError;
use crate::models::{Alignment, Token};
use crate::stitch::stitch_all;
use crate::window::{default_overlap, windows};

/// Window geometry for chunked alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunking {
    /// Tokens per side in each window. Must be > 0.
    pub chunk_size: usize,
    /// Tokens shared by consecutive windows; defaults to
    /// [`default_overlap`] of `chunk_size`.
    pub overlap_size: Option<usize>,
}

impl Chunking {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            overlap_size: None,
        }
    }

    pub fn with_overlap(mut self, overlap_size: usize) -> Self {
        self.overlap_size = Some(overlap_size);
        self
    }

    /// Overlap actually used: the configured one or `min(4, chunk_size / 2)`.
    pub fn effective_overlap(&self) -> usize {
        self.overlap_size
            .unwrap_or_else(|| default_overlap(self.chunk_size))
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        if self.chunk_size == 0 {
            return Err(AlignError::InvalidChunkSize(self.chunk_size));
        }
        Ok(())
    }
}

/// Align two sequences, optionally in overlapping chunks.
///
/// With `chunking == None` this is exactly [`align`]. Otherwise each
/// window is aligned on its own (with its own embedding lookup) and the
/// window alignments are stitched in order.
pub async fn align_chunked<P>(
    left: &[Token],
    right: &[Token],
    gap_penalty: f64,
    chunking: Option<Chunking>,
    provider: &P,
) -> Result<Alignment, AlignError>
where
    P: EmbeddingProvider + ?Sized,
{
    let Some(chunking) = chunking else {
        return align(left, right, gap_penalty, provider).await;
    };
    chunking.validate()?;
    validate_gap_penalty(gap_penalty)?;

    let overlap = chunking.effective_overlap();
    let mut aligned = Vec::new();
    for (idx, (l, r)) in windows(left, right, chunking.chunk_size, overlap)?.enumerate() {
        tracing::debug!(chunk = idx, left = l.len(), right = r.len(), "aligning chunk");
        aligned.push(align(l, r, gap_penalty, provider).await?);
    }

    Ok(stitch_all(aligned, overlap))
}
