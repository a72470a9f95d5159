//! # ragchat
//!
//! A retrieval-augmented chat service. Documents are embedded into an
//! exact L2 vector index; questions retrieve the nearest documents, which
//! are assembled into a prompt and handed to a generation backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ Embedder  │──▶│  Pipeline    │──▶│ Index + Documents │
//! │ hash/http │   │ ingest/query │   │ (one RwLock)      │
//! └───────────┘   └──────┬───────┘   └──────────────────┘
//!                        │
//!                 ┌──────┴───────┐
//!                 ▼              ▼
//!           ┌──────────┐   ┌──────────┐
//!           │   CLI    │   │   HTTP   │
//!           │ (ragchat)│   │  (axum)  │
//!           └──────────┘   └──────────┘
//! ```
//!
//! The storage, retrieval, and prompt logic lives in `ragchat-core`; this
//! crate adds configuration, HTTP providers, and the server.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding providers (hash, OpenAI, Ollama, local) |
//! | [`generation`] | Generation providers (extractive, Ollama, OpenAI) |
//! | [`engine`] | Builds a [`ragchat_core::ChatEngine`] from config |
//! | [`seed`] | JSONL bulk ingestion |
//! | [`server`] | HTTP API |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod embedding;
pub mod engine;
pub mod generation;
mod http;
pub mod logging;
pub mod seed;
pub mod server;
