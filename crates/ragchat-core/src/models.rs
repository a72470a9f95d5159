//! Data types that flow through the ingestion and retrieval pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque key-value metadata attached to a document. Stored, never interpreted.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A document waiting to be ingested.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// A stored document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Caller-supplied identifier, unique within the store.
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Insertion slot; equals the position of this document's vector in the index.
    pub position: usize,
    pub ingested_at: DateTime<Utc>,
}

/// One retrieval hit, in distance-ascending order within a result set.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieved {
    pub id: String,
    pub text: String,
    pub position: usize,
    /// Euclidean distance between the query and document embeddings.
    pub distance: f32,
}
