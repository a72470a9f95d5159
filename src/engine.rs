//! Wires configuration into a ready [`ChatEngine`].

use anyhow::{Context, Result};
use ragchat_core::{ChatEngine, RetrievalPipeline};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::generation::create_generator;
use crate::seed::{ingest_seed, load_seed};

/// Build the embedder, store, and generator described by `config`.
pub fn build_engine(config: &Config) -> Result<Arc<ChatEngine>> {
    let embedder = create_embedder(&config.embedding)?;
    let generator = create_generator(&config.generation)?;

    info!(
        embedding = embedder.model_name(),
        dims = embedder.dims(),
        generation = generator.model_name(),
        capacity = config.retrieval.max_documents,
        "engine ready"
    );

    let pipeline = Arc::new(RetrievalPipeline::new(
        embedder,
        config.retrieval.max_documents,
    ));
    let engine = ChatEngine::new(
        pipeline,
        generator,
        config.generation.options(),
        config.retrieval.top_k,
    )
    .context("Invalid generation or retrieval settings")?;

    Ok(Arc::new(engine))
}

/// [`build_engine`], then ingest `seed` when given.
pub async fn build_seeded_engine(config: &Config, seed: Option<&Path>) -> Result<Arc<ChatEngine>> {
    let engine = build_engine(config)?;
    if let Some(path) = seed {
        let docs = load_seed(path)?;
        ingest_seed(engine.pipeline(), docs).await?;
    }
    Ok(engine)
}
