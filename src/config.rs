//! TOML configuration.
//!
//! Every section is optional; a missing file section takes the defaults
//! below, and the CLI can override individual values.
//!
//! ```toml
//! [embedding]
//! provider = "ollama"
//! model = "nomic-embed-text"
//!
//! [alignment]
//! gap_penalty = 0.1
//! chunk_size = 4
//! overlap_size = 2
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use semantic_aligner_core::align::DEFAULT_GAP_PENALTY;
use semantic_aligner_core::chunked::Chunking;

/// Provider names accepted in `embedding.provider`.
pub const PROVIDERS: &[&str] = &["ollama", "openai", "hashed", "local", "disabled"];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub alignment: AlignmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL for Ollama (default `http://localhost:11434`).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            dims: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlignmentConfig {
    #[serde(default = "default_gap_penalty")]
    pub gap_penalty: f64,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub overlap_size: Option<usize>,
    #[serde(default = "default_max_parallel_chunks")]
    pub max_parallel_chunks: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            gap_penalty: default_gap_penalty(),
            chunk_size: None,
            overlap_size: None,
            max_parallel_chunks: default_max_parallel_chunks(),
        }
    }
}

fn default_gap_penalty() -> f64 {
    DEFAULT_GAP_PENALTY
}
fn default_max_parallel_chunks() -> usize {
    4
}

impl AlignmentConfig {
    /// Chunk geometry, or `None` when chunking is not requested.
    pub fn chunking(&self) -> Option<Chunking> {
        self.chunk_size.map(|chunk_size| Chunking {
            chunk_size,
            overlap_size: self.overlap_size,
        })
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Apply a model identifier, accepting the `provider/model` shorthand.
    ///
    /// `ollama/nomic-embed-text` selects the Ollama provider and the
    /// `nomic-embed-text` model. A prefix that is not a provider name is
    /// kept as part of the model (`BAAI/bge-small-en-v1.5`).
    pub fn apply_model_id(&mut self, id: &str) {
        match id.split_once('/') {
            Some((provider, model)) if PROVIDERS.contains(&provider) && !model.is_empty() => {
                self.provider = provider.to_string();
                self.model = Some(model.to_string());
            }
            _ => self.model = Some(id.to_string()),
        }
    }
}

impl Config {
    /// Check value ranges after parsing and after CLI overrides.
    pub fn validate(&self) -> Result<()> {
        let gap = self.alignment.gap_penalty;
        if !gap.is_finite() || gap < 0.0 {
            anyhow::bail!("alignment.gap_penalty must be a finite value >= 0, got {}", gap);
        }

        if self.alignment.chunk_size == Some(0) {
            anyhow::bail!("alignment.chunk_size must be > 0");
        }

        if self.alignment.max_parallel_chunks == 0 {
            anyhow::bail!("alignment.max_parallel_chunks must be >= 1");
        }

        if !PROVIDERS.contains(&self.embedding.provider.as_str()) {
            anyhow::bail!(
                "Unknown embedding provider: '{}'. Must be one of: {}.",
                self.embedding.provider,
                PROVIDERS.join(", ")
            );
        }

        if self.embedding.dims == Some(0) {
            anyhow::bail!("embedding.dims must be > 0 when set");
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}
