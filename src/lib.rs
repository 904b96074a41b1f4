//! # Semantic Aligner
//!
//! Aligns two sequences of text tokens by meaning rather than by spelling,
//! using embedding similarity as the cost in a monotonic dynamic-programming
//! alignment. Long inputs can be aligned in overlapping windows which are
//! then stitched back into one alignment.
//!
//! The algorithms live in [`semantic_aligner_core`], which has no I/O. This
//! crate adds the parts that talk to the outside world: configuration,
//! concrete embedding providers, input files, output rendering, and the
//! concurrent chunk pipeline behind the `salign` binary.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────┐
//! │   Input    │──▶│   Windows   │──▶│   Align    │──▶│  Stitch  │
//! │ JSON/lines │   │   overlap   │   │ (parallel) │   │  (fold)  │
//! └────────────┘   └─────────────┘   └─────┬──────┘   └──────────┘
//!                                          │
//!                                    ┌─────▼─────┐
//!                                    │ Embedding │
//!                                    │ provider  │
//!                                    └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! salign align --left a.txt --right b.txt                 # Ollama, nomic-embed-text
//! salign align --input pair.json --chunk-size 8 --format json
//! salign align --input pair.json --provider hashed        # offline
//! salign stitch --chunks chunks.json --overlap-size 2
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding provider implementations |
//! | [`input`] | Input file parsing |
//! | [`render`] | Table and JSON output |
//! | [`pipeline`] | Concurrent chunked alignment and command handlers |

pub mod config;
pub mod embedding;
pub mod input;
pub mod pipeline;
pub mod render;

pub use semantic_aligner_core;
