//! Offline embedding by signed character n-gram hashing.
//!
//! Each text is lowercased, wrapped in BOS/EOS markers, and its uni-, bi-,
//! and trigrams are hashed (FNV-1a) into a fixed number of buckets with a
//! ±1 sign taken from the hash's low bit. The result is L2-normalised.
//!
//! This captures surface similarity only (shared spelling, not meaning), but
//! it needs no network or model download, so it backs offline runs and the
//! integration tests.

use anyhow::Result;
use async_trait::async_trait;

use semantic_aligner_core::embedding::EmbeddingProvider;

pub const DEFAULT_HASHED_DIMS: usize = 256;

const BOS: char = '\u{0002}';
const EOS: char = '\u{0003}';

pub struct HashedProvider {
    dims: usize,
}

impl HashedProvider {
    pub fn new(dims: Option<usize>) -> Self {
        Self {
            dims: dims.unwrap_or(DEFAULT_HASHED_DIMS).max(1),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashedProvider {
    fn model_name(&self) -> &str {
        "hashed-ngram"
    }
    fn dims(&self) -> usize {
        self.dims
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_text(t, self.dims)).collect())
    }
}

fn fnv1a(chars: &[char]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &c in chars {
        let mut buf = [0u8; 4];
        for &b in c.encode_utf8(&mut buf).as_bytes() {
            hash ^= u32::from(b);
            hash = hash.wrapping_mul(0x0100_0193);
        }
    }
    hash
}

fn embed_text(text: &str, dims: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dims];

    let mut chars: Vec<char> = Vec::with_capacity(text.len() + 2);
    chars.push(BOS);
    chars.extend(text.to_lowercase().chars());
    chars.push(EOS);

    for n in [3usize, 2, 1] {
        for gram in chars.windows(n) {
            let h = fnv1a(gram);
            let idx = h as usize % dims;
            v[idx] += if h & 1 == 0 { 1.0 } else { -1.0 };
        }
    }

    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use semantic_aligner_core::cost::cosine_distance;

    #[test]
    fn test_same_text_same_vector() {
        let a = embed_text("Hello", 64);
        let b = embed_text("hello", 64);
        assert_eq!(a, b);
        assert!(cosine_distance(&a, &b) < 1e-6);
    }

    #[test]
    fn test_vectors_are_normalised() {
        let v = embed_text("semantic alignment", 128);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_shared_spelling_is_closer() {
        let cat = embed_text("cat", DEFAULT_HASHED_DIMS);
        let cats = embed_text("cats", DEFAULT_HASHED_DIMS);
        let zebra = embed_text("zebra", DEFAULT_HASHED_DIMS);
        assert!(cosine_distance(&cat, &cats) < cosine_distance(&cat, &zebra));
    }

    #[tokio::test]
    async fn test_provider_embeds_every_text() {
        let provider = HashedProvider::new(Some(32));
        let out = provider
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.len() == 32));
    }
}
