//! Error taxonomy for the alignment core.
//!
//! Every variant is fatal for the call that produced it. Nothing here is
//! retried by the core; retry policy belongs to the embedding provider.

use thiserror::Error;

/// Errors raised by alignment, windowing, and embedding lookup.
#[derive(Debug, Error)]
pub enum AlignError {
    /// Malformed input shape, such as a row that is not a pair.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Chunked alignment was requested with a chunk size of zero.
    #[error("chunk size must be > 0, got {0}")]
    InvalidChunkSize(usize),

    /// Gap penalty is negative, NaN, or infinite.
    #[error("gap penalty must be a finite value >= 0, got {0}")]
    InvalidGapPenalty(f64),

    /// The embedding provider failed the batched request.
    #[error("embedding request via {model} failed")]
    Provider {
        /// Model identifier reported by the provider.
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The provider answered, but the response cannot be used.
    ///
    /// # When This Occurs
    ///
    /// - Vector count differs from the number of requested tokens
    /// - Vectors in one response have different dimensions
    #[error("malformed embedding response: {0}")]
    MalformedEmbeddings(String),

    /// A DP cell on the reconstruction path has no recorded move.
    ///
    /// Indicates a bug in table construction; never expected at runtime.
    #[error("backpointer missing at ({row}, {col})")]
    MissingBackpointer { row: usize, col: usize },
}
