//! # Semantic Aligner CLI (`salign`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `salign align` | Align two token lists by semantic similarity |
//! | `salign stitch` | Fold pre-aligned chunks into a single alignment |
//!
//! ## Examples
//!
//! ```bash
//! # One token per line, empty lines are gaps
//! salign align --left ours.txt --right theirs.txt
//!
//! # JSON input, chunked, offline embeddings
//! salign align --input pair.json --chunk-size 8 --overlap-size 2 --provider hashed
//!
//! # Pick a model with the provider/model shorthand
//! salign align --input pair.json --model openai/text-embedding-3-small
//!
//! # Inspect stitching on hand-written chunks
//! salign stitch --chunks chunks.json --overlap-size 2 -vv
//! ```

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use semantic_aligner::config::{self, Config};
use semantic_aligner::pipeline::{self, AlignSource, StitchSource};
use semantic_aligner::render::OutputFormat;

/// Semantic Aligner: align two token lists by meaning.
#[derive(Parser)]
#[command(
    name = "salign",
    about = "Align two token lists by semantic similarity",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align two sequences.
    ///
    /// Reads either one JSON file (`{"left": [...], "right": [...]}` or
    /// `[[left, right], ...]`) or two line files. Command-line options
    /// override the config file.
    Align {
        /// JSON input file.
        #[arg(long, conflicts_with_all = ["left", "right"])]
        input: Option<PathBuf>,

        /// Left tokens, one per line; empty lines are gaps.
        #[arg(long, requires = "right")]
        left: Option<PathBuf>,

        /// Right tokens, one per line; empty lines are gaps.
        #[arg(long, requires = "left")]
        right: Option<PathBuf>,

        /// Cost of pairing a token with a gap.
        #[arg(long)]
        gap_penalty: Option<f64>,

        /// Align in windows of this many tokens per side.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Tokens shared by consecutive windows (default: min(4, chunk_size / 2)).
        #[arg(long)]
        overlap_size: Option<usize>,

        /// Embedding model, optionally as `provider/model`.
        #[arg(long)]
        model: Option<String>,

        /// Embedding provider: ollama, openai, hashed, local, disabled.
        #[arg(long)]
        provider: Option<String>,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Print the unaligned inputs side by side first.
        #[arg(long)]
        show_inputs: bool,
    },

    /// Stitch chunk alignments.
    ///
    /// `--chunks` folds a JSON array of alignments in order. `--tail` with
    /// `--chunk` runs one transition and prints the rows it would append.
    Stitch {
        /// JSON array of chunk alignments.
        #[arg(long, conflicts_with_all = ["tail", "chunk"])]
        chunks: Option<PathBuf>,

        /// Accumulated alignment (JSON rows).
        #[arg(long, requires = "chunk")]
        tail: Option<PathBuf>,

        /// Next chunk alignment (JSON rows).
        #[arg(long, requires = "tail")]
        chunk: Option<PathBuf>,

        /// Overlap the chunks were produced with.
        #[arg(long)]
        overlap_size: usize,

        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Align {
            input,
            left,
            right,
            gap_penalty,
            chunk_size,
            overlap_size,
            model,
            provider,
            format,
            show_inputs,
        } => {
            let mut cfg = match &cli.config {
                Some(path) => config::load_config(path)?,
                None => Config::default(),
            };

            if let Some(provider) = provider {
                cfg.embedding.provider = provider;
            }
            if let Some(model) = model {
                cfg.embedding.apply_model_id(&model);
            }
            if let Some(gap) = gap_penalty {
                cfg.alignment.gap_penalty = gap;
            }
            if chunk_size.is_some() {
                cfg.alignment.chunk_size = chunk_size;
            }
            if overlap_size.is_some() {
                cfg.alignment.overlap_size = overlap_size;
            }
            cfg.validate()?;

            let source = match (input, left, right) {
                (Some(path), _, _) => AlignSource::Json(path),
                (None, Some(left), Some(right)) => AlignSource::Lines { left, right },
                _ => bail!("Provide --input FILE or both --left FILE and --right FILE"),
            };

            pipeline::run_align(&cfg, &source, format, show_inputs).await?;
        }
        Commands::Stitch {
            chunks,
            tail,
            chunk,
            overlap_size,
            format,
        } => {
            let source = match (chunks, tail, chunk) {
                (Some(path), _, _) => StitchSource::Chunks(path),
                (None, Some(tail), Some(chunk)) => StitchSource::Pair { tail, chunk },
                _ => bail!("Provide --chunks FILE or both --tail FILE and --chunk FILE"),
            };

            pipeline::run_stitch(&source, overlap_size, format)?;
        }
    }

    Ok(())
}
