//! JSONL seed files: bulk ingestion at startup.
//!
//! One document per line, blank lines and `#` comments ignored:
//!
//! ```text
//! {"id": "cats", "text": "cats are mammals", "metadata": {"source": "wiki"}}
//! {"id": "dogs", "text": "dogs are mammals"}
//! ```

use anyhow::{Context, Result};
use ragchat_core::{NewDocument, RetrievalPipeline};
use std::path::Path;
use tracing::info;

/// Parse seed documents from JSONL text.
pub fn parse_seed(content: &str) -> Result<Vec<NewDocument>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let t = line.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("seed line {}: invalid document", n + 1))
        })
        .collect()
}

pub fn load_seed(path: &Path) -> Result<Vec<NewDocument>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    parse_seed(&content)
}

/// Ingest every seed document in order as one batch: the embedder sees
/// the whole file (and splits it by its own batch size), and a bad
/// document leaves the store untouched.
pub async fn ingest_seed(pipeline: &RetrievalPipeline, docs: Vec<NewDocument>) -> Result<usize> {
    let stored = pipeline
        .ingest_batch(docs)
        .await
        .context("Failed to ingest seed documents")?;
    info!(documents = stored.len(), "seed ingested");
    Ok(stored.len())
}
