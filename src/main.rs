//! # RGPD RAG CLI (`rgpd`)
//!
//! Command-line interface for the RGPD retrieval pipeline: segmenting
//! the regulation, building the vector collection, and asking grounded
//! questions against it.
//!
//! ## Usage
//!
//! ```bash
//! rgpd --config ./config/rgpd.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rgpd chunk` | Segment the regulation text into the chunk JSON file |
//! | `rgpd index` | Embed the chunk file and rebuild the Chroma collection |
//! | `rgpd inspect` | Show collection stats and sample records |
//! | `rgpd search "<query>"` | Ranked semantic retrieval report |
//! | `rgpd ask [question]` | Grounded LLM answer; interactive loop without an argument |
//!
//! ## Examples
//!
//! ```bash
//! # Segment the regulation text
//! rgpd chunk
//!
//! # Build the vector collection (Ollama + Chroma must be running)
//! rgpd index
//!
//! # Retrieve without generation
//! rgpd search "droit à l'effacement" --limit 5
//!
//! # Full RAG, interactive
//! rgpd ask
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rgpd_rag::{answer, chunk_cmd, config, index, search};

/// RGPD RAG — retrieval-augmented question answering over the GDPR.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file; every field has a sensible local default.
#[derive(Parser)]
#[command(
    name = "rgpd",
    about = "Retrieval-augmented question answering over the GDPR (RGPD)",
    version,
    long_about = "Segments the RGPD into considérants and articles, embeds them with a local \
    Ollama model into a Chroma collection, and answers questions grounded in the retrieved \
    units, citing the articles used."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rgpd.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Segment the regulation text into the chunk JSON file.
    ///
    /// Extracts considérants and articles, reports the boundary
    /// heuristic used and any missing article numbers, and writes the
    /// chunk collection to the configured path. Never fails on
    /// malformed input — degraded extraction is reported, not fatal.
    Chunk,

    /// Embed the chunk file and rebuild the Chroma collection.
    ///
    /// The collection is deleted and recreated on every run (wholesale
    /// rebuild, cosine distance). Requires Ollama and Chroma running.
    Index,

    /// Show collection statistics and sample records.
    Inspect,

    /// Search the indexed regulation semantically.
    ///
    /// Embeds the query and prints the top results with cosine
    /// similarity scores.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results (defaults to retrieval.top_k).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Ask a question and get an answer grounded in retrieved chunks.
    ///
    /// With a question argument, answers once. Without one, starts an
    /// interactive loop (type `quit`, `exit`, or `q` to leave). LLM
    /// failures are reported, never crash the session.
    Ask {
        /// The question to answer. Omit for interactive mode.
        question: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing config file is fine — defaults target a local setup.
    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::default()
    };

    match cli.command {
        Commands::Chunk => {
            chunk_cmd::run_chunk(&cfg)?;
        }
        Commands::Index => {
            index::run_index(&cfg).await?;
        }
        Commands::Inspect => {
            search::run_inspect(&cfg).await?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit).await?;
        }
        Commands::Ask { question } => {
            answer::run_ask(&cfg, question).await?;
        }
    }

    Ok(())
}
