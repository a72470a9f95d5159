//! Embedding provider trait and the built-in offline embedder.
//!
//! Concrete network-backed providers (OpenAI, Ollama, fastembed) live in
//! the `ragchat` app crate and implement [`Embedder`].

use anyhow::{bail, ensure, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::distance::normalize;

/// A text-to-vector model with a fixed output dimensionality.
///
/// Implementations must be deterministic for a given model version and
/// must return exactly one `dims()`-length vector per input, in input
/// order. Any failure fails the calling operation; there is no partial or
/// degraded embedding.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text. Checks the provider's output shape.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.embed(&[text.to_string()]).await?;
        check_embeddings(1, self.dims(), &vectors)?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
    }
}

/// Verify a provider response: `expected` vectors, each `dims` long, all finite.
pub fn check_embeddings(expected: usize, dims: usize, vectors: &[Vec<f32>]) -> Result<()> {
    ensure!(
        vectors.len() == expected,
        "provider returned {} embeddings for {} inputs",
        vectors.len(),
        expected
    );
    for (i, v) in vectors.iter().enumerate() {
        ensure!(
            v.len() == dims,
            "embedding {} has {} dimensions, expected {}",
            i,
            v.len(),
            dims
        );
        ensure!(
            v.iter().all(|x| x.is_finite()),
            "embedding {} contains non-finite values",
            i
        );
    }
    Ok(())
}

/// Deterministic feature-hashing embedder. No model, no network.
///
/// Each lowercase alphanumeric token is hashed with SHA-256; the first
/// eight bytes pick a bucket and the ninth a sign. The bucket counts are
/// L2-normalized. Texts sharing words land close together, identical
/// texts land on the same point.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 {
            bail!("hash embedder dims must be > 0");
        }
        Ok(Self { dims })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let idx = (u64::from_le_bytes(bucket) % self.dims as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        normalize(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}
