//! The content store: a [`VectorIndex`] and a [`DocumentStore`] owned as
//! one unit.
//!
//! The Nth vector in the index and the Nth document in the store always
//! describe the same document. [`ContentStore::insert`] is the only
//! mutation; it runs every check that could fail before touching either
//! half, so an insert is all-or-nothing. Reads verify that both halves
//! have the same length before resolving positions.
//!
//! The store does no locking of its own. The owner
//! ([`RetrievalPipeline`](crate::pipeline::RetrievalPipeline)) wraps it in
//! a single `RwLock` so the append pair and the search/lookup path are
//! serialized against each other.

pub mod documents;

pub use documents::DocumentStore;

use std::collections::HashSet;

use tracing::{error, warn};

use crate::error::{RagError, Result};
use crate::index::{FlatIndex, VectorIndex};
use crate::models::{Document, Metadata, NewDocument, Retrieved};

/// Vector index plus document store, kept in lockstep.
pub struct ContentStore<I: VectorIndex = FlatIndex> {
    index: I,
    documents: DocumentStore,
    capacity: usize,
}

impl ContentStore<FlatIndex> {
    /// An empty store backed by an exhaustive [`FlatIndex`].
    pub fn new(dims: usize, capacity: usize) -> Self {
        Self::with_index(FlatIndex::new(dims), capacity)
    }
}

impl<I: VectorIndex> ContentStore<I> {
    /// Wrap an existing, empty index.
    pub fn with_index(index: I, capacity: usize) -> Self {
        Self {
            index,
            documents: DocumentStore::new(),
            capacity,
        }
    }

    pub fn dims(&self) -> usize {
        self.index.dims()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of documents. Equal to the index size while consistent.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn vector_count(&self) -> usize {
        self.index.len()
    }

    /// Validate an insert without the vector. Used to reject bad requests
    /// before paying for an embedding.
    pub fn check_insert(&self, id: &str, text: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(RagError::EmptyId);
        }
        if text.trim().is_empty() {
            return Err(RagError::EmptyText);
        }
        if self.documents.contains(id) {
            return Err(RagError::DuplicateId(id.to_string()));
        }
        if self.documents.len() >= self.capacity {
            return Err(RagError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Validate a whole batch: every document individually, no id repeated
    /// within the batch, and room for all of them.
    pub fn check_batch(&self, docs: &[NewDocument]) -> Result<()> {
        let mut ids = HashSet::with_capacity(docs.len());
        for doc in docs {
            self.check_insert(&doc.id, &doc.text)?;
            if !ids.insert(doc.id.as_str()) {
                return Err(RagError::DuplicateId(doc.id.clone()));
            }
        }
        if self.documents.len() + docs.len() > self.capacity {
            return Err(RagError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Append `vector` to the index and the document to the store, as one unit.
    ///
    /// Returns the shared position.
    pub fn insert(
        &mut self,
        id: &str,
        text: &str,
        metadata: Option<Metadata>,
        vector: &[f32],
    ) -> Result<usize> {
        self.check_consistency()?;
        self.check_insert(id, text)?;
        if vector.len() != self.index.dims() {
            return Err(RagError::DimensionMismatch {
                expected: self.index.dims(),
                actual: vector.len(),
            });
        }

        // Both appends were validated above and cannot fail on input; a
        // failure here is an index bug and is caught by check_consistency.
        let position = self.index.add(vector)?;
        let doc_position = self.documents.append(id, text, metadata)?;
        if position != doc_position {
            error!(
                vector_position = position,
                document_position = doc_position,
                "content store appended at diverging positions"
            );
            return Err(RagError::Inconsistent {
                vectors: self.index.len(),
                documents: self.documents.len(),
            });
        }
        Ok(position)
    }

    /// Nearest documents to `query`, distance ascending.
    ///
    /// Positions that do not resolve to a document are skipped with a
    /// warning rather than failing the whole search.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Retrieved>> {
        self.check_consistency()?;
        let neighbors = self.index.search(query, k)?;

        let mut results = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            match self.documents.get_by_position(n.position) {
                Ok(doc) => results.push(Retrieved {
                    id: doc.id.clone(),
                    text: doc.text.clone(),
                    position: n.position,
                    distance: n.distance,
                }),
                Err(e) => {
                    warn!(position = n.position, error = %e, "skipping unresolved index position");
                }
            }
        }
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<&Document> {
        self.documents.get_by_id(id)
    }

    pub fn get_by_position(&self, position: usize) -> Result<&Document> {
        self.documents.get_by_position(position)
    }

    /// Fails with [`RagError::Inconsistent`] when the two halves disagree in size.
    pub fn check_consistency(&self) -> Result<()> {
        let vectors = self.index.len();
        let documents = self.documents.len();
        if vectors != documents {
            error!(vectors, documents, "content store out of sync");
            return Err(RagError::Inconsistent { vectors, documents });
        }
        Ok(())
    }
}
