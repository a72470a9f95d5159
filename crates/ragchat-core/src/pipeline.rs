//! Retrieval pipeline: the only component that spans embedding, the
//! vector index, and the document store.
//!
//! # Locking
//!
//! The [`ContentStore`] sits behind one `RwLock`. Ingest takes the write
//! lock for the validate-and-append pair; retrieval and lookups take the
//! read lock, so readers always see both halves at the same length.
//! Embedding happens before any lock is taken and the lock is never held
//! across an `.await`.
//!
//! A poisoned lock is recovered rather than propagated: inserts validate
//! everything before mutating, and every read re-checks that both halves
//! agree in size.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, info};

use crate::embedding::{check_embeddings, Embedder};
use crate::error::{RagError, Result};
use crate::models::{Document, Metadata, NewDocument, Retrieved};
use crate::store::ContentStore;

/// Snapshot of the pipeline's size and configuration.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub documents: usize,
    pub vectors: usize,
    pub dims: usize,
    pub capacity: usize,
    pub embedding_model: String,
}

pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    store: RwLock<ContentStore>,
}

impl RetrievalPipeline {
    /// Create a pipeline with an empty exact index sized to the embedder.
    pub fn new(embedder: Arc<dyn Embedder>, capacity: usize) -> Self {
        let store = ContentStore::new(embedder.dims(), capacity);
        Self {
            embedder,
            store: RwLock::new(store),
        }
    }

    /// Create a pipeline around an existing store.
    ///
    /// Fails if the store's dimensionality differs from the embedder's.
    pub fn with_store(embedder: Arc<dyn Embedder>, store: ContentStore) -> Result<Self> {
        if store.dims() != embedder.dims() {
            return Err(RagError::DimensionMismatch {
                expected: store.dims(),
                actual: embedder.dims(),
            });
        }
        Ok(Self {
            embedder,
            store: RwLock::new(store),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, ContentStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContentStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Embed `text` and store it under `id`.
    ///
    /// Either both the vector and the document are appended, or neither is.
    /// Validation runs once before embedding (to avoid paying for a
    /// doomed request) and again under the write lock (to close the race
    /// between two ingests of the same id).
    pub async fn ingest(
        &self,
        id: &str,
        text: &str,
        metadata: Option<Metadata>,
    ) -> Result<Document> {
        self.read().check_insert(id, text)?;

        let vector = self
            .embedder
            .embed_one(text)
            .await
            .map_err(RagError::Embedding)?;

        let mut store = self.write();
        let position = store.insert(id, text, metadata, &vector)?;
        let doc = store.get_by_position(position)?.clone();
        drop(store);

        info!(id = %doc.id, position, "ingested document");
        Ok(doc)
    }

    /// Embed and store a batch of documents with one embedder call.
    ///
    /// All-or-nothing over the whole batch: every document is validated
    /// before embedding and again under the write lock, so either all of
    /// them are appended (in order) or none are.
    pub async fn ingest_batch(&self, docs: Vec<NewDocument>) -> Result<Vec<Document>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        self.read().check_batch(&docs)?;

        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .await
            .map_err(RagError::Embedding)?;
        check_embeddings(texts.len(), self.embedder.dims(), &vectors)
            .map_err(RagError::Embedding)?;

        let mut store = self.write();
        store.check_batch(&docs)?;
        let mut stored = Vec::with_capacity(docs.len());
        for (doc, vector) in docs.into_iter().zip(&vectors) {
            let position = store.insert(&doc.id, &doc.text, doc.metadata, vector)?;
            stored.push(store.get_by_position(position)?.clone());
        }
        drop(store);

        info!(documents = stored.len(), "ingested batch");
        Ok(stored)
    }

    /// Ids and texts of the `k` documents closest to `query`, nearest first.
    ///
    /// Returns fewer than `k` results when the store is smaller, and an
    /// empty list (without calling the embedder) when it is empty.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Retrieved>> {
        if k == 0 {
            return Err(RagError::InvalidK(k));
        }
        if query.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }
        if self.read().is_empty() {
            debug!("retrieve on empty store");
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed_one(query)
            .await
            .map_err(RagError::Embedding)?;

        let results = self.read().search(&vector, k)?;
        debug!(k, results = results.len(), "retrieved documents");
        Ok(results)
    }

    /// Look up a stored document by id.
    pub fn get(&self, id: &str) -> Result<Document> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> PipelineStats {
        let store = self.read();
        PipelineStats {
            documents: store.len(),
            vectors: store.vector_count(),
            dims: store.dims(),
            capacity: store.capacity(),
            embedding_model: self.embedder.model_name().to_string(),
        }
    }
}
