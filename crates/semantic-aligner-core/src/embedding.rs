//! Embedding provider trait and the per-invocation embedding lookup.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, plus [`EmbeddingLookup`], the token → vector map built once
//! for each alignment call and dropped afterwards.
//!
//! Concrete providers (Ollama, OpenAI, hashed, fastembed) live in the
//! `semantic-aligner` app crate.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::AlignError;
use crate::models::Token;

/// Trait for embedding providers.
///
/// `embed` receives distinct, non-gap token texts and must return one
/// vector per input, in input order. A failure must be atomic: return an
/// error rather than a partial list.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"nomic-embed-text"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality, or `0` when unknown.
    fn dims(&self) -> usize;
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Insertion-ordered set of token texts.
///
/// The index map answers membership; the append-only vector fixes the
/// order in which tokens were first seen.
#[derive(Debug, Default, Clone)]
pub struct OrderedTokenSet {
    index: HashMap<String, usize>,
    order: Vec<String>,
}

impl OrderedTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `text` if unseen. Returns `true` when it was newly added.
    pub fn insert(&mut self, text: &str) -> bool {
        if self.index.contains_key(text) {
            return false;
        }
        self.index.insert(text.to_string(), self.order.len());
        self.order.push(text.to_string());
        true
    }

    /// Collect the distinct non-gap tokens of `tokens`, first occurrence first.
    pub fn from_tokens<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let mut set = Self::new();
        for text in tokens.into_iter().flatten() {
            set.insert(text);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Token text → embedding vector, scoped to one alignment call.
#[derive(Debug, Default, Clone)]
pub struct EmbeddingLookup {
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingLookup {
    /// An empty lookup. Every pairing of two tokens falls back to the gap cost.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Request vectors for every distinct non-gap token of both sequences
    /// in one batched call.
    ///
    /// Skips the provider entirely when neither side has a token.
    ///
    /// # Errors
    ///
    /// - [`AlignError::Provider`] when the provider call fails.
    /// - [`AlignError::MalformedEmbeddings`] when the vector count does not
    ///   match the request, or non-empty vectors disagree on dimension.
    pub async fn build<P>(provider: &P, left: &[Token], right: &[Token]) -> Result<Self, AlignError>
    where
        P: EmbeddingProvider + ?Sized,
    {
        let unique = OrderedTokenSet::from_tokens(left.iter().chain(right.iter()));
        if unique.is_empty() {
            return Ok(Self::empty());
        }

        tracing::info!(
            "Requesting embeddings for {} unique items via {}",
            unique.len(),
            provider.model_name()
        );

        let texts = unique.into_vec();
        let vectors = provider
            .embed(&texts)
            .await
            .map_err(|e| AlignError::Provider {
                model: provider.model_name().to_string(),
                source: e.into(),
            })?;

        Self::from_response(texts, vectors)
    }

    /// Zip requested texts with a provider response.
    ///
    /// Empty vectors are treated as missing and left out of the lookup.
    pub fn from_response(texts: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self, AlignError> {
        if texts.len() != vectors.len() {
            return Err(AlignError::MalformedEmbeddings(format!(
                "requested {} vectors, received {}",
                texts.len(),
                vectors.len()
            )));
        }

        let mut dims: Option<usize> = None;
        let mut map = HashMap::with_capacity(texts.len());
        for (text, vec) in texts.into_iter().zip(vectors) {
            if vec.is_empty() {
                tracing::warn!("No embedding returned for {:?}; pairing falls back to gap cost", text);
                continue;
            }
            match dims {
                None => dims = Some(vec.len()),
                Some(d) if d != vec.len() => {
                    return Err(AlignError::MalformedEmbeddings(format!(
                        "inconsistent dimensions: expected {}, got {} for {:?}",
                        d,
                        vec.len(),
                        text
                    )));
                }
                Some(_) => {}
            }
            map.insert(text, vec);
        }

        Ok(Self { vectors: map })
    }

    /// Vector for `text`, if the provider returned one.
    pub fn get(&self, text: &str) -> Option<&[f32]> {
        self.vectors.get(text).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl FromIterator<(String, Vec<f32>)> for EmbeddingLookup {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f32>)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingProvider {
        calls: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    impl RecordingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for RecordingProvider {
        fn model_name(&self) -> &str {
            "recording"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.lock().unwrap().push(texts.to_vec());
            if self.fail {
                anyhow::bail!("provider offline");
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    fn toks(items: &[Option<&str>]) -> Vec<Token> {
        items.iter().map(|t| t.map(str::to_string)).collect()
    }

    #[test]
    fn test_ordered_set_keeps_first_occurrence() {
        let tokens = toks(&[Some("b"), None, Some("a"), Some("b"), Some("c"), Some("a")]);
        let set = OrderedTokenSet::from_tokens(tokens.iter());
        assert_eq!(set.as_slice(), &["b", "a", "c"]);
    }

    #[test]
    fn test_ordered_set_insert_reports_novelty() {
        let mut set = OrderedTokenSet::new();
        assert!(set.insert("x"));
        assert!(!set.insert("x"));
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_build_issues_single_deduplicated_call() {
        let provider = RecordingProvider::new(false);
        let left = toks(&[Some("dog"), None, Some("cat")]);
        let right = toks(&[Some("cat"), Some("mouse"), None]);

        let lookup = EmbeddingLookup::build(&provider, &left, &right).await.unwrap();

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec!["dog", "cat", "mouse"]);
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup.get("mouse"), Some(&[5.0f32, 1.0][..]));
    }

    #[tokio::test]
    async fn test_build_skips_provider_when_all_gaps() {
        let provider = RecordingProvider::new(true);
        let lookup = EmbeddingLookup::build(&provider, &toks(&[None]), &[]).await.unwrap();
        assert!(lookup.is_empty());
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_propagates_provider_failure() {
        let provider = RecordingProvider::new(true);
        let err = EmbeddingLookup::build(&provider, &toks(&[Some("a")]), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AlignError::Provider { ref model, .. } if model == "recording"));
    }

    #[test]
    fn test_response_count_mismatch_is_malformed() {
        let err = EmbeddingLookup::from_response(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, AlignError::MalformedEmbeddings(_)));
    }

    #[test]
    fn test_response_dimension_mismatch_is_malformed() {
        let err = EmbeddingLookup::from_response(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 0.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, AlignError::MalformedEmbeddings(_)));
    }

    #[test]
    fn test_empty_vector_is_left_out() {
        let lookup = EmbeddingLookup::from_response(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 0.0], vec![]],
        )
        .unwrap();
        assert!(lookup.get("a").is_some());
        assert!(lookup.get("b").is_none());
    }
}
