//! # ragchat core
//!
//! Runtime-agnostic logic for ragchat: the exact vector index, the
//! document store it is paired with, the retrieval pipeline, prompt
//! assembly, and the embedding/generation provider traits.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies.
//! Concrete network-backed providers live in the `ragchat` app crate.
//!
//! ## Data flow
//!
//! ```text
//! ingest:  text ──▶ Embedder ──▶ ContentStore { VectorIndex + DocumentStore }
//! query:   text ──▶ Embedder ──▶ VectorIndex::search ──▶ DocumentStore lookup
//!                                   ──▶ Prompt::new ──▶ Generator ──▶ answer
//! ```

pub mod chat;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod store;

pub use chat::{ChatEngine, ChatResponse};
pub use distance::{Distance, L2};
pub use embedding::{Embedder, HashEmbedder};
pub use error::{ErrorKind, RagError, Result};
pub use generation::{ExtractiveGenerator, GenerationOptions, Generator};
pub use index::{FlatIndex, Neighbor, VectorIndex};
pub use models::{Document, Metadata, NewDocument, Retrieved};
pub use pipeline::{PipelineStats, RetrievalPipeline};
pub use prompt::Prompt;
pub use store::{ContentStore, DocumentStore};
