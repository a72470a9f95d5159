//! # ragchat CLI
//!
//! ```bash
//! # Start the HTTP server, preloading documents
//! ragchat serve --seed ./data/seed.jsonl --config ./config/ragchat.toml
//!
//! # One-shot question against a seed file
//! ragchat ask "what do cats eat?" --seed ./data/seed.jsonl --k 2
//!
//! # Validate configuration and provider setup
//! ragchat check
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ragchat::{config, engine, logging, server};

/// ragchat: retrieval-augmented chat over an in-memory vector store.
#[derive(Parser)]
#[command(name = "ragchat", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// A missing file falls back to built-in defaults.
    #[arg(long, global = true, default_value = "./config/ragchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// JSONL file of documents to ingest before accepting requests.
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Answer a single question and print the response as JSON.
    Ask {
        /// The question.
        query: String,

        /// JSONL file of documents to ingest first.
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Number of documents to retrieve (defaults to `retrieval.top_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Validate the configuration and construct the providers.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;
    logging::init(&cfg.logging);

    match cli.command {
        Commands::Serve { seed } => {
            let engine = engine::build_seeded_engine(&cfg, seed.as_deref()).await?;
            server::run_server(&cfg, engine).await?;
        }
        Commands::Ask { query, seed, k } => {
            let engine = engine::build_seeded_engine(&cfg, seed.as_deref()).await?;
            let resp = engine.answer(&query, None, k).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Commands::Check => {
            let engine = engine::build_engine(&cfg)?;
            let stats = engine.pipeline().stats();
            println!("Configuration OK.");
            println!(
                "  embedding:  {} ({} dims)",
                stats.embedding_model, stats.dims
            );
            println!("  generation: {}", engine.generator().model_name());
            println!("  top_k:      {}", engine.top_k());
            println!("  capacity:   {}", stats.capacity);
            println!("  bind:       {}", cfg.server.bind);
        }
    }

    Ok(())
}
