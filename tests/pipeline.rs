//! End-to-end pipeline tests: segment → index → retrieve, over the
//! in-memory store with a deterministic fake embedder (no network).

use anyhow::Result;
use async_trait::async_trait;

use rgpd_rag::chunk_file::{load_chunks, save_chunks};
use rgpd_rag::embedding::Embedder;
use rgpd_rag::index::index_chunks;
use rgpd_rag::models::ChunkKind;
use rgpd_rag::search::retrieve;
use rgpd_rag::segment::segment;
use rgpd_rag::store::memory::MemoryStore;
use rgpd_rag::store::VectorStore;

const FILLER: &str = "la protection des personnes physiques à l'égard du traitement des \
                      données à caractère personnel est un droit fondamental";

fn regulation_text() -> String {
    format!(
        "(1) La protection des données {filler}. \
         (2) Les principes et les règles {filler}. \
         CHAPITRE I Dispositions générales \
         Article premier Objet et objectifs: {filler}. \
         Article 2 Champ d'application matériel: {filler}. \
         Article 3 Champ d'application territorial: {filler}.",
        filler = FILLER
    )
}

/// Deterministic text-to-vector mapping: a normalized byte histogram.
/// Identical texts embed identically, so querying with a stored
/// document's exact text must rank that record first.
struct FakeEmbedder;

fn hash_vector(text: &str) -> Vec<f32> {
    let mut v = [0f32; 16];
    for (i, b) in text.bytes().enumerate() {
        v[(b as usize + i) % 16] += 1.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(f32::EPSILON);
    v.iter().map(|x| x / norm).collect()
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model_name(&self) -> &str {
        "fake-histogram"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_vector(t)).collect())
    }
}

#[tokio::test]
async fn test_segment_index_retrieve_round_trip() {
    let seg = segment(&regulation_text());
    assert_eq!(seg.chunks.len(), 5, "2 recitals + 3 articles expected");

    let store = MemoryStore::new();
    let added = index_chunks(&FakeEmbedder, &store, "rgpd", &seg.chunks, 32)
        .await
        .unwrap();
    assert_eq!(added, 5);
    assert_eq!(store.count("rgpd").await.unwrap(), 5);

    // Querying with a stored document's exact text ranks it first with
    // a perfect score.
    let target = seg
        .chunks
        .iter()
        .find(|c| c.id == "article_2")
        .unwrap()
        .embedding_text();
    let hits = retrieve(&FakeEmbedder, &store, "rgpd", &target, 3)
        .await
        .unwrap();

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, "article_2");
    assert!((hits[0].score - 1.0).abs() < 1e-5);
    assert_eq!(hits[0].meta.kind, ChunkKind::Article);
    assert_eq!(hits[0].meta.number, 2);

    // Descending score order, within (-1, 1].
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for hit in &hits {
        assert!(hit.score <= 1.0 + 1e-6 && hit.score > -1.0);
    }
}

#[tokio::test]
async fn test_k_above_collection_size_returns_all() {
    let seg = segment(&regulation_text());
    let store = MemoryStore::new();
    index_chunks(&FakeEmbedder, &store, "rgpd", &seg.chunks, 32)
        .await
        .unwrap();

    let hits = retrieve(&FakeEmbedder, &store, "rgpd", "question", 20)
        .await
        .unwrap();
    assert_eq!(hits.len(), 5);
}

#[tokio::test]
async fn test_reindex_replaces_collection() {
    let seg = segment(&regulation_text());
    let store = MemoryStore::new();

    index_chunks(&FakeEmbedder, &store, "rgpd", &seg.chunks, 32)
        .await
        .unwrap();
    index_chunks(&FakeEmbedder, &store, "rgpd", &seg.chunks, 32)
        .await
        .unwrap();

    // Wholesale rebuild: no duplicate records after a second run.
    assert_eq!(store.count("rgpd").await.unwrap(), 5);
}

#[tokio::test]
async fn test_batched_embedding_preserves_alignment() {
    let seg = segment(&regulation_text());
    let store = MemoryStore::new();

    // batch_size 1 forces one embed call per chunk.
    index_chunks(&FakeEmbedder, &store, "rgpd", &seg.chunks, 1)
        .await
        .unwrap();

    let records = store.get_all("rgpd").await.unwrap();
    assert_eq!(records.len(), 5);
    for record in &records {
        assert_eq!(record.embedding, hash_vector(&record.document));
    }
}

#[tokio::test]
async fn test_empty_chunk_collection_is_rejected() {
    let store = MemoryStore::new();
    let err = index_chunks(&FakeEmbedder, &store, "rgpd", &[], 32)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No chunks"));
}

#[tokio::test]
async fn test_chunk_file_feeds_the_indexer() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("rgpd_chunks.json");

    let seg = segment(&regulation_text());
    save_chunks(&path, &seg.chunks).unwrap();
    let loaded = load_chunks(&path).unwrap();
    assert_eq!(loaded, seg.chunks);

    let store = MemoryStore::new();
    let added = index_chunks(&FakeEmbedder, &store, "rgpd", &loaded, 32)
        .await
        .unwrap();
    assert_eq!(added, 5);
}
