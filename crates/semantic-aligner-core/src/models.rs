//! Core data models shared by the alignment engine and the stitcher.
//!
//! A [`Token`] is a piece of text or a gap. An [`AlignedRow`] pairs one
//! token from each side, and an [`Alignment`] is the ordered list of rows
//! produced by a monotonic walk through both input sequences.

use serde::{Deserialize, Serialize};

/// A text token, or `None` for an explicit gap.
pub type Token = Option<String>;

/// An ordered sequence of aligned rows.
pub type Alignment = Vec<AlignedRow>;

/// One row of an alignment: a left token paired with a right token.
///
/// Serializes as a two-element array (`["a", null]`) so alignments read the
/// same way they are written in input files.
///
/// Rows emitted by the alignment engine never have both sides absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Token, Token)", into = "(Token, Token)")]
pub struct AlignedRow {
    pub left: Token,
    pub right: Token,
}

impl AlignedRow {
    /// Build a row from borrowed string sides.
    pub fn new(left: Option<&str>, right: Option<&str>) -> Self {
        Self {
            left: left.map(str::to_string),
            right: right.map(str::to_string),
        }
    }

    /// `true` when both sides carry a token.
    pub fn is_full(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// `true` when exactly one side is a gap.
    pub fn is_half_gap(&self) -> bool {
        self.left.is_some() != self.right.is_some()
    }

    /// `true` when both sides are gaps.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The same row with its sides swapped.
    pub fn mirrored(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }
}

impl From<(Token, Token)> for AlignedRow {
    fn from((left, right): (Token, Token)) -> Self {
        Self { left, right }
    }
}

impl From<AlignedRow> for (Token, Token) {
    fn from(row: AlignedRow) -> Self {
        (row.left, row.right)
    }
}

/// Input accepted by the alignment entry points.
///
/// Callers either hand over the two sequences directly or a list of
/// pre-paired rows, which is split column-wise into two sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentInput {
    Sequences { left: Vec<Token>, right: Vec<Token> },
    Rows(Vec<AlignedRow>),
}

impl AlignmentInput {
    /// Normalize into `(left, right)` sequences.
    ///
    /// Row input keeps gaps in place: row `i` contributes `left[i]` and
    /// `right[i]`, so both sequences have the row count as their length.
    pub fn into_sequences(self) -> (Vec<Token>, Vec<Token>) {
        match self {
            AlignmentInput::Sequences { left, right } => (left, right),
            AlignmentInput::Rows(rows) => rows.into_iter().map(|r| (r.left, r.right)).unzip(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_predicates() {
        let full = AlignedRow::new(Some("a"), Some("x"));
        let half = AlignedRow::new(None, Some("x"));
        let empty = AlignedRow::new(None, None);

        assert!(full.is_full() && !full.is_half_gap());
        assert!(half.is_half_gap() && !half.is_full());
        assert!(empty.is_empty() && !empty.is_half_gap());
    }

    #[test]
    fn test_row_serializes_as_pair() {
        let row = AlignedRow::new(Some("a"), None);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["a",null]"#);

        let back: AlignedRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_rows_normalize_to_sequences() {
        let input = AlignmentInput::Rows(vec![
            AlignedRow::new(Some("a"), Some("x")),
            AlignedRow::new(None, Some("y")),
            AlignedRow::new(Some("b"), None),
        ]);
        let (left, right) = input.into_sequences();
        assert_eq!(left, vec![Some("a".to_string()), None, Some("b".to_string())]);
        assert_eq!(right, vec![Some("x".to_string()), Some("y".to_string()), None]);
    }

    #[test]
    fn test_mirrored_swaps_sides() {
        let row = AlignedRow::new(Some("a"), None);
        assert_eq!(row.mirrored(), AlignedRow::new(None, Some("a")));
    }
}
