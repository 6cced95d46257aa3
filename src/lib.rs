//! # RGPD RAG
//!
//! Retrieval-augmented question answering over the GDPR (RGPD, the
//! French text of Regulation 2016/679).
//!
//! The pipeline segments the regulation into addressable units
//! (considérants and articles), embeds each unit with a local Ollama
//! model, persists the vectors in a Chroma collection, and at query
//! time retrieves the nearest units to ground an LLM answer that cites
//! only the retrieved articles.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌─────────┐   ┌──────────┐
//! │ Regulation │──▶│ Segmenter │──▶│ Indexer │──▶│  Chroma   │
//! │  (text)    │   │  (regex)  │   │ +Ollama │   │ (cosine)  │
//! └───────────┘   └───────────┘   └─────────┘   └────┬─────┘
//!                                                    │
//!                        question ──▶ Retriever ─────┤
//!                                         │          ▼
//!                                         ▼     scored chunks
//!                                  Answer Composer ──▶ Ollama LLM
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Chunk, metadata, and search-result types |
//! | [`segment`] | Regulation text segmentation (the core) |
//! | [`chunk_file`] | JSON persistence of the chunk collection |
//! | [`embedding`] | Embedding provider abstraction (Ollama) |
//! | [`store`] | Vector store abstraction (Chroma, in-memory) |
//! | [`index`] | Collection rebuild from the chunk file |
//! | [`search`] | Semantic retrieval and inspection |
//! | [`answer`] | Grounding prompt assembly and LLM call |

pub mod answer;
pub mod chunk_cmd;
pub mod chunk_file;
pub mod config;
pub mod embedding;
pub mod index;
pub mod models;
pub mod search;
pub mod segment;
pub mod store;
