//! Indexer: chunk file → embeddings → vector collection rebuild.
//!
//! Indexing is a one-shot wholesale rebuild — the collection is deleted
//! and recreated on every run, never updated incrementally. Embedding
//! or storage errors are fatal for the run.

use anyhow::{bail, Result};

use crate::chunk_file;
use crate::config::Config;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::models::Chunk;
use crate::store::chroma::ChromaStore;
use crate::store::VectorStore;

/// Embed every chunk and rebuild the collection from scratch.
///
/// Builds the four parallel sequences the store contract expects: the
/// chunk id, the embedded document text (`title\n\nbody`), the vector,
/// and the metadata mirror. Returns the number of records added.
pub async fn index_chunks(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    collection: &str,
    chunks: &[Chunk],
    batch_size: usize,
) -> Result<usize> {
    if chunks.is_empty() {
        bail!("No chunks to index");
    }

    let ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
    let documents: Vec<String> = chunks.iter().map(|c| c.embedding_text()).collect();
    let metadatas = chunks.iter().map(|c| c.meta()).collect();

    let mut embeddings = Vec::with_capacity(documents.len());
    for batch in documents.chunks(batch_size) {
        let vectors = embedder.embed(batch).await?;
        embeddings.extend(vectors);
    }

    store.create_or_replace(collection).await?;
    store
        .add(collection, ids, documents, embeddings, metadatas)
        .await?;

    Ok(chunks.len())
}

/// CLI entry point for `rgpd index`.
pub async fn run_index(config: &Config) -> Result<()> {
    println!("1. Loading chunks...");
    let chunks = chunk_file::load_chunks(&config.document.chunks_path)?;
    println!("   {} chunks loaded", chunks.len());

    let embedder = OllamaEmbedder::new(&config.embedding)?;
    let store = ChromaStore::new(&config.chroma)?;
    println!(
        "2. Embedding with {} ({} per batch)...",
        embedder.model_name(),
        config.embedding.batch_size
    );

    let added = index_chunks(
        &embedder,
        &store,
        &config.chroma.collection,
        &chunks,
        config.embedding.batch_size,
    )
    .await?;

    println!("3. Collection '{}' rebuilt", config.chroma.collection);
    println!("   {} chunks indexed", added);
    Ok(())
}
