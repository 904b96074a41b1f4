//! Chunk stitcher: folds per-window alignments into one alignment.
//!
//! Each window is aligned independently, so neighbouring alignments
//! describe their shared overlap twice, possibly with different gap
//! placement. The stitcher only sees rows, never token positions, and
//! infers which rows describe the same pairing from their content.
//!
//! # Transition Algorithm
//!
//! For the accumulator tail window `T` (last `2·overlap` rows) and the new
//! chunk `C` with head window `H` (first `2·overlap` rows):
//!
//! 1. **Anchor**: the first row of `H` with both sides present. None →
//!    append `C` unchanged ([`AnchorStatus::Missing`]).
//! 2. Locate the anchor in `T`, either verbatim or as a row that merges
//!    into exactly the anchor. None → append `C` unchanged
//!    ([`AnchorStatus::HeadOnly`]); the fold then trims the trailing
//!    permutable gap block of the tail.
//! 3. **Absorb**: each head row before the anchor merges into the nearest
//!    compatible tail row at or before the tail anchor, scanning backward.
//!    Unmatched head rows are leftovers and are emitted verbatim.
//! 4. **Overlap**: from both anchors, walk forward merging rows pairwise
//!    while compatible.
//! 5. Emit `leftovers + rewritten tail rows + merged overlap + rest of C`,
//!    and trim the accumulator from the earliest rewritten tail row.
//!
//! Only the bounded tail window is inspected, so each transition costs
//! `O(overlap²)` regardless of how long the accumulator has grown.

use crate::models::{AlignedRow, Alignment};

/// Merge two rows that plausibly describe the same pairing.
///
/// Returns `None` when the rows conflict (different tokens on the same
/// side) or share no token at all. Otherwise each side is filled from `a`
/// when present, else from `b`.
///
/// ```rust
/// use semantic_aligner_core::models::AlignedRow;
/// use semantic_aligner_core::stitch::merge_rows;
///
/// let a = AlignedRow::new(Some("pizza"), None);
/// let b = AlignedRow::new(Some("pizza"), Some("pizza pie"));
/// assert_eq!(merge_rows(&a, &b), Some(b.clone()));
///
/// let unrelated = AlignedRow::new(None, Some("cat"));
/// assert_eq!(merge_rows(&a, &unrelated), None);
/// ```
pub fn merge_rows(a: &AlignedRow, b: &AlignedRow) -> Option<AlignedRow> {
    if conflicts(&a.left, &b.left) || conflicts(&a.right, &b.right) {
        return None;
    }

    let shared = shares(&a.left, &b.left) || shares(&a.right, &b.right);
    if !shared {
        return None;
    }

    Some(AlignedRow {
        left: a.left.clone().or_else(|| b.left.clone()),
        right: a.right.clone().or_else(|| b.right.clone()),
    })
}

fn conflicts(x: &Option<String>, y: &Option<String>) -> bool {
    matches!((x, y), (Some(x), Some(y)) if x != y)
}

fn shares(x: &Option<String>, y: &Option<String>) -> bool {
    matches!((x, y), (Some(x), Some(y)) if x == y)
}

/// Index of the first row with both sides present.
pub fn canonical_anchor(rows: &[AlignedRow]) -> Option<usize> {
    rows.iter().position(AlignedRow::is_full)
}

/// Length of the trailing run of rows with exactly one side present.
///
/// Two independent alignments may order such rows differently, so the run
/// is treated as unreliable when no anchor ties the windows together.
pub fn trailing_permutable_len(rows: &[AlignedRow]) -> usize {
    rows.iter().rev().take_while(|r| r.is_half_gap()).count()
}

/// How the head anchor related to the tail window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStatus {
    /// Anchor found in the head window and located in the tail window.
    Matched,
    /// The head window has an anchor, but the tail window does not contain it.
    HeadOnly,
    /// The head window has no row with both sides present.
    Missing,
}

/// Outcome of a single chunk transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Rows to append after trimming.
    pub rows: Vec<AlignedRow>,
    /// Rows to drop from the end of the accumulator before appending.
    ///
    /// Only meaningful for [`AnchorStatus::Matched`]; `0` otherwise.
    pub trim: usize,
    pub anchor: AnchorStatus,
}

impl Transition {
    fn passthrough(new_chunk: &[AlignedRow], anchor: AnchorStatus) -> Self {
        Self {
            rows: new_chunk.to_vec(),
            trim: 0,
            anchor,
        }
    }
}

/// Tail window after the head prefix has been absorbed into it.
struct Absorbed {
    window: Vec<AlignedRow>,
    leftovers: Vec<AlignedRow>,
    earliest_rewrite: Option<usize>,
}

fn window_len(overlap_size: usize) -> usize {
    overlap_size.saturating_mul(2)
}

/// Tail index of the head anchor: a verbatim match first, then a row that
/// merges into exactly the anchor.
fn locate_anchor(tail: &[AlignedRow], anchor: &AlignedRow) -> Option<usize> {
    tail.iter().position(|r| r == anchor).or_else(|| {
        tail.iter()
            .position(|r| merge_rows(r, anchor).as_ref() == Some(anchor))
    })
}

/// Merge each head-prefix row into the nearest compatible tail row at or
/// before `tail_anchor`.
///
/// Works on a copy of the tail window. Later head rows see the merges made
/// by earlier ones.
fn absorb_head_prefix(tail: &[AlignedRow], tail_anchor: usize, head_prefix: &[AlignedRow]) -> Absorbed {
    let mut window = tail.to_vec();
    let mut leftovers = Vec::new();
    let mut earliest_rewrite: Option<usize> = None;

    for head_row in head_prefix {
        let hit = (0..=tail_anchor)
            .rev()
            .find_map(|t| merge_rows(&window[t], head_row).map(|merged| (t, merged)));

        match hit {
            Some((t, merged)) => {
                if merged != window[t] {
                    window[t] = merged;
                    earliest_rewrite = Some(earliest_rewrite.map_or(t, |e| e.min(t)));
                }
            }
            None => leftovers.push(head_row.clone()),
        }
    }

    Absorbed {
        window,
        leftovers,
        earliest_rewrite,
    }
}

/// Merged rows of the compatible run starting at both anchors.
fn verified_overlap(
    tail: &[AlignedRow],
    new_chunk: &[AlignedRow],
    tail_start: usize,
    head_start: usize,
) -> Vec<AlignedRow> {
    tail[tail_start..]
        .iter()
        .zip(&new_chunk[head_start..])
        .map_while(|(t, h)| merge_rows(t, h))
        .collect()
}

/// Reconcile `new_chunk` with the accumulator tail.
///
/// `tail` is the end of the accumulator; only its last `2·overlap_size`
/// rows are inspected. [`Transition::trim`] counts from the end of `tail`,
/// which is also the end of the accumulator.
pub fn stitch_core(tail: &[AlignedRow], new_chunk: &[AlignedRow], overlap_size: usize) -> Transition {
    let w = window_len(overlap_size);
    let tail_window = &tail[tail.len().saturating_sub(w)..];
    let head_window = &new_chunk[..new_chunk.len().min(w)];

    let Some(head_anchor) = canonical_anchor(head_window) else {
        return Transition::passthrough(new_chunk, AnchorStatus::Missing);
    };
    let anchor_row = &head_window[head_anchor];

    let Some(tail_anchor) = locate_anchor(tail_window, anchor_row) else {
        return Transition::passthrough(new_chunk, AnchorStatus::HeadOnly);
    };

    let absorbed = absorb_head_prefix(tail_window, tail_anchor, &head_window[..head_anchor]);
    let rewrite_from = absorbed.earliest_rewrite.unwrap_or(tail_anchor);

    let overlap = verified_overlap(&absorbed.window, new_chunk, tail_anchor, head_anchor);
    let rest = &new_chunk[head_anchor + overlap.len()..];

    let mut rows = Vec::with_capacity(
        absorbed.leftovers.len() + (tail_anchor - rewrite_from) + overlap.len() + rest.len(),
    );
    rows.extend(absorbed.leftovers);
    rows.extend_from_slice(&absorbed.window[rewrite_from..tail_anchor]);
    rows.extend(overlap);
    rows.extend_from_slice(rest);

    Transition {
        rows,
        trim: tail_window.len() - rewrite_from,
        anchor: AnchorStatus::Matched,
    }
}

/// Stitch one chunk onto a tail window and return the rows to append.
///
/// Diagnostic counterpart of [`stitch_all`] for a single transition; the
/// trim decision is not reported.
pub fn stitch_two(tail: &[AlignedRow], new_chunk: &[AlignedRow], overlap_size: usize) -> Vec<AlignedRow> {
    stitch_core(tail, new_chunk, overlap_size).rows
}

/// Fold chunk alignments, in order, into a single alignment.
///
/// The first chunk seeds the accumulator. For each later chunk:
///
/// - [`AnchorStatus::Matched`]: drop [`Transition::trim`] rows, append.
/// - [`AnchorStatus::HeadOnly`]: drop `min(trailing permutable run of the
///   original tail window, overlap_size)` rows, append the chunk as is.
/// - [`AnchorStatus::Missing`]: append the chunk as is.
///
/// With `overlap_size == 0` the windows are empty, every transition is
/// `Missing`, and the result is plain concatenation.
pub fn stitch_all<I>(chunks: I, overlap_size: usize) -> Alignment
where
    I: IntoIterator<Item = Alignment>,
{
    let mut chunks = chunks.into_iter();
    let Some(mut acc) = chunks.next() else {
        return Vec::new();
    };

    let w = window_len(overlap_size);

    for (idx, chunk) in chunks.enumerate() {
        let tail = &acc[acc.len().saturating_sub(w)..];
        let head = &chunk[..chunk.len().min(w)];
        tracing::trace!(?tail, ?head, "before stitch");

        let transition = stitch_core(tail, &chunk, overlap_size);
        let trim = match transition.anchor {
            AnchorStatus::Matched => transition.trim,
            AnchorStatus::HeadOnly => trailing_permutable_len(tail).min(overlap_size),
            AnchorStatus::Missing => 0,
        };

        tracing::debug!(
            chunk = idx + 1,
            anchor = ?transition.anchor,
            trim,
            appended = transition.rows.len(),
            "stitched chunk"
        );
        tracing::trace!(rows = ?transition.rows, "after stitch");

        acc.truncate(acc.len().saturating_sub(trim));
        acc.extend(transition.rows);
    }

    acc
}
