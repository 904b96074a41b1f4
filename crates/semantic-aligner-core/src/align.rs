//! DTW-style alignment engine.
//!
//! Pairs two token sequences by filling a `(m+1) × (n+1)` cost table where
//! each step either pairs one token from each side (diagonal), consumes a
//! left token against a gap (up), or consumes a right token against a gap
//! (left). The cheapest path from `(0, 0)` to `(m, n)` is the alignment.
//!
//! # Recurrence
//!
//! ```text
//! dp[0][0] = 0
//! dp[i][0] = i · gap            (up)
//! dp[0][j] = j · gap            (left)
//! dp[i][j] = min(
//!     dp[i-1][j-1] + pair_cost(left[i-1], right[j-1]),   diagonal
//!     dp[i-1][j]   + gap,                                up
//!     dp[i][j-1]   + gap,                                left
//! )
//! ```
//!
//! Ties resolve diagonal, then up, then left: a later candidate replaces
//! the current best only when strictly cheaper.

use crate::cost::pair_cost;
use crate::embedding::{EmbeddingLookup, EmbeddingProvider};
use crate::error::AlignError;
use crate::models::{AlignedRow, Alignment, AlignmentInput, Token};

/// Default cost of pairing a token with a gap.
pub const DEFAULT_GAP_PENALTY: f64 = 0.1;

/// Backpointer recorded for a DP cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Pair `left[i-1]` with `right[j-1]`.
    Diagonal,
    /// Pair `left[i-1]` with a gap.
    Up,
    /// Pair a gap with `right[j-1]`.
    Left,
}

/// An alignment together with its total path cost `dp[m][n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub rows: Alignment,
    pub total_cost: f64,
}

/// Reject negative, NaN, and infinite gap penalties.
pub fn validate_gap_penalty(gap_penalty: f64) -> Result<(), AlignError> {
    if gap_penalty.is_finite() && gap_penalty >= 0.0 {
        Ok(())
    } else {
        Err(AlignError::InvalidGapPenalty(gap_penalty))
    }
}

/// Flat row-major DP table: `cost[i * cols + j]`.
struct DpTable {
    cols: usize,
    cost: Vec<f64>,
    back: Vec<Option<Move>>,
}

impl DpTable {
    fn new(m: usize, n: usize) -> Self {
        let cols = n + 1;
        Self {
            cols,
            cost: vec![0.0; (m + 1) * cols],
            back: vec![None; (m + 1) * cols],
        }
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    #[inline]
    fn cost(&self, i: usize, j: usize) -> f64 {
        self.cost[self.idx(i, j)]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, cost: f64, mv: Move) {
        let k = self.idx(i, j);
        self.cost[k] = cost;
        self.back[k] = Some(mv);
    }

    #[inline]
    fn back(&self, i: usize, j: usize) -> Option<Move> {
        self.back[self.idx(i, j)]
    }
}

/// Run the DP against an already built lookup.
///
/// This is the synchronous half of [`align`]; it performs no I/O.
pub fn solve(
    left: &[Token],
    right: &[Token],
    lookup: &EmbeddingLookup,
    gap_penalty: f64,
) -> Result<Solution, AlignError> {
    let (m, n) = (left.len(), right.len());
    let mut table = DpTable::new(m, n);

    for i in 1..=m {
        table.set(i, 0, i as f64 * gap_penalty, Move::Up);
    }
    for j in 1..=n {
        table.set(0, j, j as f64 * gap_penalty, Move::Left);
    }

    for i in 1..=m {
        for j in 1..=n {
            let diag = table.cost(i - 1, j - 1)
                + pair_cost(
                    left[i - 1].as_deref(),
                    right[j - 1].as_deref(),
                    lookup,
                    gap_penalty,
                );
            let up = table.cost(i - 1, j) + gap_penalty;
            let left_cost = table.cost(i, j - 1) + gap_penalty;

            let mut best = diag;
            let mut mv = Move::Diagonal;
            if up < best {
                best = up;
                mv = Move::Up;
            }
            if left_cost < best {
                best = left_cost;
                mv = Move::Left;
            }
            table.set(i, j, best, mv);
        }
    }

    let rows = traceback(&table, left, right)?;
    let total_cost = table.cost(m, n);
    tracing::info!("DTW alignment complete with total cost {:.4}", total_cost);

    Ok(Solution { rows, total_cost })
}

/// Walk backpointers from `(m, n)` to `(0, 0)` and emit rows in input order.
///
/// A gap token in the input consumed against a gap yields a row with no
/// token on either side; such rows are not emitted.
fn traceback(table: &DpTable, left: &[Token], right: &[Token]) -> Result<Alignment, AlignError> {
    let (mut i, mut j) = (left.len(), right.len());
    let mut rows = Vec::with_capacity(i + j);

    while i > 0 || j > 0 {
        match table.back(i, j) {
            Some(Move::Diagonal) => {
                rows.push(AlignedRow {
                    left: left[i - 1].clone(),
                    right: right[j - 1].clone(),
                });
                i -= 1;
                j -= 1;
            }
            Some(Move::Up) => {
                rows.push(AlignedRow {
                    left: left[i - 1].clone(),
                    right: None,
                });
                i -= 1;
            }
            Some(Move::Left) => {
                rows.push(AlignedRow {
                    left: None,
                    right: right[j - 1].clone(),
                });
                j -= 1;
            }
            None => return Err(AlignError::MissingBackpointer { row: i, col: j }),
        }
    }

    rows.retain(|r| !r.is_empty());
    rows.reverse();
    Ok(rows)
}

/// Align two sequences, returning rows and the total path cost.
///
/// Builds a fresh [`EmbeddingLookup`] for this call only.
pub async fn align_with_cost<P>(
    left: &[Token],
    right: &[Token],
    gap_penalty: f64,
    provider: &P,
) -> Result<Solution, AlignError>
where
    P: EmbeddingProvider + ?Sized,
{
    validate_gap_penalty(gap_penalty)?;
    let lookup = EmbeddingLookup::build(provider, left, right).await?;
    solve(left, right, &lookup, gap_penalty)
}

/// Align two sequences by semantic similarity.
///
/// # Errors
///
/// - [`AlignError::InvalidGapPenalty`] for a negative or non-finite penalty.
/// - [`AlignError::Provider`] / [`AlignError::MalformedEmbeddings`] when the
///   embedding request fails.
pub async fn align<P>(
    left: &[Token],
    right: &[Token],
    gap_penalty: f64,
    provider: &P,
) -> Result<Alignment, AlignError>
where
    P: EmbeddingProvider + ?Sized,
{
    Ok(align_with_cost(left, right, gap_penalty, provider).await?.rows)
}

/// Align either input shape; rows are split into two sequences first.
pub async fn align_input<P>(
    input: AlignmentInput,
    gap_penalty: f64,
    provider: &P,
) -> Result<Alignment, AlignError>
where
    P: EmbeddingProvider + ?Sized,
{
    let (left, right) = input.into_sequences();
    align(&left, &right, gap_penalty, provider).await
}
