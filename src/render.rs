//! Output rendering for alignments.
//!
//! Table rows are numbered from 1 and padded so the `|` separator lines up:
//!
//! ```text
//!   1. cat   | cat
//!   2. mouse |
//!   3.       | dog
//! ```

use anyhow::Result;
use clap::ValueEnum;

use semantic_aligner_core::{AlignedRow, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn cell(token: &Token) -> &str {
    token.as_deref().unwrap_or("")
}

fn left_width<'a, I>(lefts: I) -> usize
where
    I: IntoIterator<Item = &'a Token>,
{
    lefts
        .into_iter()
        .map(|t| cell(t).chars().count())
        .max()
        .unwrap_or(0)
}

/// Render rows as an aligned text table, one line per row.
pub fn render_table(rows: &[AlignedRow]) -> String {
    let width = left_width(rows.iter().map(|r| &r.left));
    let mut out = String::new();
    for (idx, row) in rows.iter().enumerate() {
        let line = format!(
            "{:3}. {:<width$} | {}",
            idx + 1,
            cell(&row.left),
            cell(&row.right),
            width = width
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Render the unaligned inputs side by side, indexed from 0.
pub fn render_raw_inputs(left: &[Token], right: &[Token]) -> String {
    let width = left_width(left);
    let mut out = String::from("=== Raw Inputs (unaligned) ===\n");
    for idx in 0..left.len().max(right.len()) {
        let l = left.get(idx).map(cell).unwrap_or("");
        let r = right.get(idx).map(cell).unwrap_or("");
        let line = format!("{:3}. {:<width$} | {}", idx, l, r, width = width);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str("=== End Raw Inputs ===\n");
    out
}

/// Render rows as a pretty-printed JSON array of `[left, right]` pairs.
pub fn render_json(rows: &[AlignedRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn render(rows: &[AlignedRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => {
            let mut s = render_json(rows)?;
            s.push('\n');
            Ok(s)
        }
    }
}
