//! Input file parsing for the `salign` commands.
//!
//! Alignment input comes in two JSON shapes, or as a pair of line files:
//!
//! ```text
//! {"left": ["a", "b"], "right": ["x", null]}    sequences
//! [["a", "x"], ["b", null]]                     pre-paired rows
//! ```
//!
//! In line files every line is one token and an empty line is a gap.
//! Stitch input is a JSON array of alignments, each an array of rows.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

use semantic_aligner_core::{AlignedRow, Alignment, AlignmentInput, Token};

/// Parse JSON alignment input in either the object or the row-list shape.
pub fn parse_alignment_input(content: &str) -> Result<AlignmentInput> {
    let value: Value = serde_json::from_str(content).context("Input is not valid JSON")?;

    match value {
        Value::Object(map) => {
            let left = map
                .get("left")
                .ok_or_else(|| anyhow::anyhow!("Input object is missing \"left\""))?;
            let right = map
                .get("right")
                .ok_or_else(|| anyhow::anyhow!("Input object is missing \"right\""))?;
            Ok(AlignmentInput::Sequences {
                left: parse_token_list(left, "left")?,
                right: parse_token_list(right, "right")?,
            })
        }
        Value::Array(rows) => Ok(AlignmentInput::Rows(parse_rows(&rows)?)),
        _ => bail!("Input must be an object with \"left\"/\"right\" or an array of rows"),
    }
}

fn parse_token(value: &Value, what: &str) -> Result<Token> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => bail!("{} must be a string or null, got {}", what, other),
    }
}

fn parse_token_list(value: &Value, side: &str) -> Result<Vec<Token>> {
    let items = value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("\"{}\" must be an array", side))?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| parse_token(v, &format!("{}[{}]", side, i)))
        .collect()
}

fn parse_rows(rows: &[Value]) -> Result<Vec<AlignedRow>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let pair = row
                .as_array()
                .ok_or_else(|| anyhow::anyhow!("row {} is not an array", i))?;
            if pair.len() != 2 {
                bail!("row {} has {} elements, expected 2", i, pair.len());
            }
            Ok(AlignedRow {
                left: parse_token(&pair[0], &format!("row {} left", i))?,
                right: parse_token(&pair[1], &format!("row {} right", i))?,
            })
        })
        .collect()
}

/// Parse a line file: one token per line, an empty line is a gap.
///
/// A trailing newline does not add a gap; `"a\n\nb\n"` is `[a, gap, b]`.
pub fn parse_lines(content: &str) -> Vec<Token> {
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                None
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}

/// Parse a single alignment (array of rows).
pub fn parse_alignment(content: &str) -> Result<Alignment> {
    let value: Value = serde_json::from_str(content).context("Alignment is not valid JSON")?;
    let rows = value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Alignment must be an array of rows"))?;
    parse_rows(rows)
}

/// Parse a list of chunk alignments for stitching.
pub fn parse_chunks(content: &str) -> Result<Vec<Alignment>> {
    let value: Value = serde_json::from_str(content).context("Chunks are not valid JSON")?;
    let chunks = value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Chunks must be an array of alignments"))?;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let rows = chunk
                .as_array()
                .ok_or_else(|| anyhow::anyhow!("chunk {} is not an array of rows", i))?;
            parse_rows(rows).with_context(|| format!("in chunk {}", i))
        })
        .collect()
}

pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
