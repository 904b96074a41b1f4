//! # Semantic Aligner Core
//!
//! Shared, I/O-free logic for Semantic Aligner: the aligned-row model, the
//! embedding-backed cost model, the DTW alignment engine, overlapping
//! windowing, and the chunk stitcher that folds per-window alignments back
//! into one result.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. Concrete
//! embedding providers live in the `semantic-aligner` app crate and are
//! passed in through the [`embedding::EmbeddingProvider`] trait.
//!
//! ```text
//! left, right ──▶ window ──▶ align (per chunk) ──▶ stitch ──▶ Alignment
//!                              │
//!                              ▼
//!                        EmbeddingProvider
//! ```

pub mod align;
pub mod chunked;
pub mod cost;
pub mod embedding;
pub mod error;
pub mod models;
pub mod stitch;
pub mod window;

pub use error::AlignError;
pub use models::{AlignedRow, Alignment, AlignmentInput, Token};
