//! Retriever: question → embedding → ranked chunk hits.

use anyhow::Result;

use crate::config::Config;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::models::SearchHit;
use crate::store::chroma::ChromaStore;
use crate::store::VectorStore;

/// Embed a question and return the top-`k` chunks as scored hits.
///
/// The score is `1 - cosine_distance`, so 1 means identical direction.
/// The store already returns results in ascending-distance order, which
/// is descending-score order — no re-sort here.
pub async fn retrieve(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    collection: &str,
    question: &str,
    k: usize,
) -> Result<Vec<SearchHit>> {
    let query_vector = embedder.embed_query(question).await?;
    let hits = store.query(collection, &query_vector, k).await?;

    Ok(hits
        .into_iter()
        .map(|hit| SearchHit {
            id: hit.id,
            meta: hit.meta,
            text: hit.document,
            score: 1.0 - hit.distance,
        })
        .collect())
}

/// CLI entry point for `rgpd search`.
pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let k = limit.unwrap_or(config.retrieval.top_k);
    let embedder = OllamaEmbedder::new(&config.embedding)?;
    let store = ChromaStore::new(&config.chroma)?;

    println!("Question: {}", query);
    println!("Searching the {} most relevant chunks...\n", k);

    let hits = retrieve(&embedder, &store, &config.chroma.collection, query, k).await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let excerpt: String = hit.text.chars().take(250).collect();
        println!("{}. {}", i + 1, hit.meta.title);
        println!("   cosine similarity: {:.4}", hit.score);
        println!("   type: {} | number: {}", hit.meta.kind, hit.meta.number);
        println!("   excerpt: {}...", excerpt);
        println!();
    }
    Ok(())
}

/// CLI entry point for `rgpd inspect`: collection stats and samples.
pub async fn run_inspect(config: &Config) -> Result<()> {
    let store = ChromaStore::new(&config.chroma)?;
    let collection = &config.chroma.collection;

    let total = store.count(collection).await?;
    println!("Collection: {}", collection);
    println!("Total chunks: {}", total);

    let records = store.get_all(collection).await?;

    println!("\nSample records:");
    for record in records.iter().take(2) {
        let excerpt: String = record.document.chars().take(150).collect();
        println!("\n  {}", record.meta.title);
        println!(
            "  type: {} | number: {}",
            record.meta.kind, record.meta.number
        );
        println!("  content: {}...", excerpt);
        println!("  embedding dimension: {}", record.embedding.len());
        if let (Some(min), Some(max)) = (
            record
                .embedding
                .iter()
                .cloned()
                .reduce(f32::min),
            record
                .embedding
                .iter()
                .cloned()
                .reduce(f32::max),
        ) {
            println!("  min: {:.4}, max: {:.4}", min, max);
        }
    }

    let mut recitals = 0usize;
    let mut articles = 0usize;
    for record in &records {
        match record.meta.kind {
            crate::models::ChunkKind::Recital => recitals += 1,
            crate::models::ChunkKind::Article => articles += 1,
        }
    }
    println!("\nBreakdown by type:");
    println!("  considérants: {}", recitals);
    println!("  articles: {}", articles);
    Ok(())
}
