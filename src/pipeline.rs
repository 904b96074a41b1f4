//! Alignment pipeline: provider, windows, concurrent chunk alignment, stitch.
//!
//! Without chunking the two sequences go straight through the core
//! [`align`]. With chunking, windows are aligned concurrently on the tokio
//! runtime, at most `max_parallel_chunks` at a time. Every window gets its
//! own embedding lookup, so nothing is shared between tasks except the
//! provider. Results are put back in window order and folded with
//! [`stitch_all`], giving the same rows as the sequential
//! [`align_chunked`](semantic_aligner_core::chunked::align_chunked).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use semantic_aligner_core::align::{align, validate_gap_penalty};
use semantic_aligner_core::stitch::{stitch_all, stitch_two};
use semantic_aligner_core::window::windows;
use semantic_aligner_core::{Alignment, Token};

use crate::config::{AlignmentConfig, Config};
use crate::embedding::{create_provider, EmbeddingProvider};
use crate::input;
use crate::render::{self, OutputFormat};

/// Align two sequences with the configured gap penalty and chunking.
pub async fn align_sequences(
    provider: Arc<dyn EmbeddingProvider>,
    left: &[Token],
    right: &[Token],
    config: &AlignmentConfig,
) -> Result<Alignment> {
    validate_gap_penalty(config.gap_penalty)?;

    let Some(chunking) = config.chunking() else {
        return Ok(align(left, right, config.gap_penalty, provider.as_ref()).await?);
    };
    chunking.validate()?;

    let overlap = chunking.effective_overlap();
    let jobs: Vec<(Vec<Token>, Vec<Token>)> = windows(left, right, chunking.chunk_size, overlap)?
        .map(|(l, r)| (l.to_vec(), r.to_vec()))
        .collect();
    let total = jobs.len();

    tracing::info!(
        chunks = total,
        chunk_size = chunking.chunk_size,
        overlap,
        parallel = config.max_parallel_chunks,
        "aligning in chunks"
    );

    let semaphore = Arc::new(Semaphore::new(config.max_parallel_chunks.max(1)));
    let mut set = JoinSet::new();

    for (idx, (l, r)) in jobs.into_iter().enumerate() {
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);
        let gap_penalty = config.gap_penalty;

        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .context("Chunk semaphore closed")?;
            tracing::debug!(chunk = idx, left = l.len(), right = r.len(), "aligning chunk");
            let rows = align(&l, &r, gap_penalty, provider.as_ref())
                .await
                .with_context(|| format!("Failed to align chunk {}", idx))?;
            Ok::<_, anyhow::Error>((idx, rows))
        });
    }

    let mut slots: Vec<Option<Alignment>> = vec![None; total];
    while let Some(joined) = set.join_next().await {
        // Dropping the set on the first error aborts the remaining tasks.
        let (idx, rows) = joined.context("Chunk task panicked")??;
        slots[idx] = Some(rows);
    }

    let chunks = slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| slot.ok_or_else(|| anyhow::anyhow!("Chunk {} produced no result", idx)))
        .collect::<Result<Vec<_>>>()?;

    Ok(stitch_all(chunks, overlap))
}

/// Where the `align` command reads its sequences from.
#[derive(Debug, Clone)]
pub enum AlignSource {
    Json(PathBuf),
    Lines { left: PathBuf, right: PathBuf },
}

/// Run the `salign align` command.
pub async fn run_align(
    config: &Config,
    source: &AlignSource,
    format: OutputFormat,
    show_inputs: bool,
) -> Result<()> {
    let (left, right) = match source {
        AlignSource::Json(path) => input::parse_alignment_input(&input::read_file(path)?)
            .with_context(|| format!("Invalid input file {}", path.display()))?
            .into_sequences(),
        AlignSource::Lines { left, right } => (
            input::parse_lines(&input::read_file(left)?),
            input::parse_lines(&input::read_file(right)?),
        ),
    };

    if show_inputs {
        println!("{}", render::render_raw_inputs(&left, &right));
    }

    let provider = create_provider(&config.embedding)?;
    tracing::info!(
        provider = %config.embedding.provider,
        model = provider.model_name(),
        left = left.len(),
        right = right.len(),
        "aligning"
    );

    let rows = align_sequences(provider, &left, &right, &config.alignment).await?;
    print!("{}", render::render(&rows, format)?);
    Ok(())
}

/// What the `stitch` command folds.
#[derive(Debug, Clone)]
pub enum StitchSource {
    /// A JSON array of chunk alignments, folded in order.
    Chunks(PathBuf),
    /// One transition: accumulated tail plus the next chunk.
    Pair { tail: PathBuf, chunk: PathBuf },
}

/// Run the `salign stitch` command.
pub fn run_stitch(source: &StitchSource, overlap_size: usize, format: OutputFormat) -> Result<()> {
    let rows = match source {
        StitchSource::Chunks(path) => {
            let chunks = input::parse_chunks(&input::read_file(path)?)
                .with_context(|| format!("Invalid chunks file {}", path.display()))?;
            tracing::info!(chunks = chunks.len(), overlap_size, "stitching");
            stitch_all(chunks, overlap_size)
        }
        StitchSource::Pair { tail, chunk } => {
            let tail_rows = input::parse_alignment(&input::read_file(tail)?)
                .with_context(|| format!("Invalid tail file {}", tail.display()))?;
            let chunk_rows = input::parse_alignment(&input::read_file(chunk)?)
                .with_context(|| format!("Invalid chunk file {}", chunk.display()))?;
            stitch_two(&tail_rows, &chunk_rows, overlap_size)
        }
    };

    print!("{}", render::render(&rows, format)?);
    Ok(())
}
