//! Vector store abstraction.
//!
//! The [`VectorStore`] trait defines the persistence contract the
//! indexer and retriever rely on: named collections of
//! (id, vector, document, metadata) records with cosine
//! nearest-neighbor query. Implementations must be `Send + Sync`.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`create_or_replace`](VectorStore::create_or_replace) | Rebuild a collection configured for cosine distance |
//! | [`add`](VectorStore::add) | Insert parallel (id, document, vector, metadata) sequences |
//! | [`query`](VectorStore::query) | k-nearest records by cosine distance |
//! | [`count`](VectorStore::count) | Number of stored records |
//! | [`get_all`](VectorStore::get_all) | Every stored record, for inspection |

pub mod chroma;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ChunkMeta;

/// One stored record returned by a nearest-neighbor query.
///
/// `distance` is the cosine distance (0 = identical, 2 = opposite);
/// callers report `1 - distance` as the similarity score.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub meta: ChunkMeta,
    pub distance: f32,
}

/// A full stored record, as returned by [`VectorStore::get_all`].
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub document: String,
    pub meta: ChunkMeta,
    pub embedding: Vec<f32>,
}

/// Abstract vector persistence backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Delete the collection if it exists (absence is a no-op, not an
    /// error), then recreate it configured for cosine distance.
    /// Idempotent.
    async fn create_or_replace(&self, collection: &str) -> Result<()>;

    /// Add records from four parallel, index-aligned sequences.
    ///
    /// Fails loudly on any length mismatch — records are never silently
    /// dropped.
    async fn add(
        &self,
        collection: &str,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<ChunkMeta>,
    ) -> Result<()>;

    /// Return the `k` nearest records by cosine distance, ascending.
    ///
    /// When fewer than `k` records are stored, all of them are returned
    /// (no padding, no error).
    async fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<QueryHit>>;

    /// Number of records in the collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Every stored record, with embeddings. For inspection reports.
    async fn get_all(&self, collection: &str) -> Result<Vec<StoredRecord>>;
}

/// Validate the parallel-sequence `add` contract shared by all backends.
pub(crate) fn check_aligned(
    ids: &[String],
    documents: &[String],
    embeddings: &[Vec<f32>],
    metadatas: &[ChunkMeta],
) -> Result<()> {
    if ids.len() != documents.len()
        || ids.len() != embeddings.len()
        || ids.len() != metadatas.len()
    {
        anyhow::bail!(
            "Mismatched add sequences: {} ids, {} documents, {} embeddings, {} metadatas",
            ids.len(),
            documents.len(),
            embeddings.len(),
            metadatas.len()
        );
    }
    Ok(())
}
