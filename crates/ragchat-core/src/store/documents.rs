//! Insertion-ordered document store with an id lookup table.

use std::collections::HashMap;

use chrono::Utc;

use crate::error::{RagError, Result};
use crate::models::{Document, Metadata};

/// Documents in insertion order, addressable by position or id.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Append a document at the next position and return that position.
    ///
    /// Fails with [`RagError::DuplicateId`] if `id` is already present; the
    /// store is unchanged in that case.
    pub fn append(&mut self, id: &str, text: &str, metadata: Option<Metadata>) -> Result<usize> {
        if self.by_id.contains_key(id) {
            return Err(RagError::DuplicateId(id.to_string()));
        }
        let position = self.docs.len();
        self.docs.push(Document {
            id: id.to_string(),
            text: text.to_string(),
            metadata,
            position,
            ingested_at: Utc::now(),
        });
        self.by_id.insert(id.to_string(), position);
        Ok(position)
    }

    pub fn get_by_position(&self, position: usize) -> Result<&Document> {
        self.docs
            .get(position)
            .ok_or(RagError::PositionOutOfRange {
                position,
                size: self.docs.len(),
            })
    }

    pub fn get_by_id(&self, id: &str) -> Result<&Document> {
        self.by_id
            .get(id)
            .and_then(|&position| self.docs.get(position))
            .ok_or_else(|| RagError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_lookup() {
        let mut store = DocumentStore::new();
        assert_eq!(store.append("a", "alpha", None).unwrap(), 0);
        assert_eq!(store.append("b", "beta", None).unwrap(), 1);

        assert_eq!(store.get_by_position(1).unwrap().id, "b");
        assert_eq!(store.get_by_id("a").unwrap().text, "alpha");
        assert_eq!(store.get_by_id("a").unwrap().position, 0);
        assert!(store.contains("b"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = DocumentStore::new();
        store.append("a", "first", None).unwrap();
        let err = store.append("a", "second", None).unwrap_err();
        assert!(matches!(err, RagError::DuplicateId(ref id) if id == "a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_id("a").unwrap().text, "first");
    }

    #[test]
    fn test_missing_lookups() {
        let mut store = DocumentStore::new();
        store.append("a", "alpha", None).unwrap();
        assert!(matches!(
            store.get_by_position(5),
            Err(RagError::PositionOutOfRange {
                position: 5,
                size: 1
            })
        ));
        assert!(matches!(store.get_by_id("zzz"), Err(RagError::NotFound(_))));
    }

    #[test]
    fn test_metadata_kept_verbatim() {
        let mut store = DocumentStore::new();
        let mut meta = Metadata::new();
        meta.insert("source".into(), serde_json::json!("wordpress"));
        meta.insert("post_id".into(), serde_json::json!(42));
        store.append("p42", "hello", Some(meta.clone())).unwrap();
        assert_eq!(store.get_by_id("p42").unwrap().metadata, Some(meta));
    }
}
