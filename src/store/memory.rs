//! In-memory [`VectorStore`] for tests.
//!
//! Brute-force cosine distance over `RwLock`-guarded collections.
//! Mirrors the ordering and k-clamping semantics the Chroma backend
//! provides, so pipeline tests exercise the real contract.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::ChunkMeta;

use super::{check_aligned, QueryHit, StoredRecord, VectorStore};

#[derive(Default)]
struct Collection {
    records: Vec<StoredRecord>,
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn create_or_replace(&self, collection: &str) -> Result<()> {
        let mut guard = self.collections.write().unwrap();
        guard.insert(collection.to_string(), Collection::default());
        Ok(())
    }

    async fn add(
        &self,
        collection: &str,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<ChunkMeta>,
    ) -> Result<()> {
        check_aligned(&ids, &documents, &embeddings, &metadatas)?;

        let mut guard = self.collections.write().unwrap();
        let col = match guard.get_mut(collection) {
            Some(c) => c,
            None => bail!("Collection not found: {}", collection),
        };
        for (((id, document), embedding), meta) in ids
            .into_iter()
            .zip(documents)
            .zip(embeddings)
            .zip(metadatas)
        {
            col.records.push(StoredRecord {
                id,
                document,
                meta,
                embedding,
            });
        }
        Ok(())
    }

    async fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let guard = self.collections.read().unwrap();
        let col = match guard.get(collection) {
            Some(c) => c,
            None => bail!("Collection not found: {}", collection),
        };

        let mut hits: Vec<QueryHit> = col
            .records
            .iter()
            .map(|r| QueryHit {
                id: r.id.clone(),
                document: r.document.clone(),
                meta: r.meta.clone(),
                distance: 1.0 - cosine_similarity(vector, &r.embedding),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let guard = self.collections.read().unwrap();
        match guard.get(collection) {
            Some(c) => Ok(c.records.len()),
            None => bail!("Collection not found: {}", collection),
        }
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        let guard = self.collections.read().unwrap();
        match guard.get(collection) {
            Some(c) => Ok(c.records.clone()),
            None => bail!("Collection not found: {}", collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkKind;

    fn meta(n: u32) -> ChunkMeta {
        ChunkMeta {
            kind: ChunkKind::Article,
            number: n,
            title: format!("Article {}", n),
        }
    }

    /// Ten unit vectors at increasing angles from the x axis, so record
    /// i is the i-th nearest to the axis query.
    async fn populate(store: &MemoryStore) {
        store.create_or_replace("test").await.unwrap();
        let mut ids = Vec::new();
        let mut docs = Vec::new();
        let mut embs = Vec::new();
        let mut metas = Vec::new();
        for i in 0..10u32 {
            let angle = i as f32 * 0.15;
            ids.push(format!("article_{}", i + 1));
            docs.push(format!("Article {} body", i + 1));
            embs.push(vec![angle.cos(), angle.sin()]);
            metas.push(meta(i + 1));
        }
        store.add("test", ids, docs, embs, metas).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_k3_of_10_returns_3_sorted() {
        let store = MemoryStore::new();
        populate(&store).await;
        let hits = store.query("test", &[1.0, 0.0], 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "article_1");
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[tokio::test]
    async fn test_query_k20_of_10_returns_all_10() {
        let store = MemoryStore::new();
        populate(&store).await;
        let hits = store.query("test", &[1.0, 0.0], 20).await.unwrap();
        assert_eq!(hits.len(), 10);
    }

    #[tokio::test]
    async fn test_add_rejects_mismatched_sequences() {
        let store = MemoryStore::new();
        store.create_or_replace("test").await.unwrap();
        let err = store
            .add(
                "test",
                vec!["a".into(), "b".into()],
                vec!["doc".into()],
                vec![vec![1.0]],
                vec![meta(1)],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Mismatched"));
    }

    #[tokio::test]
    async fn test_add_accepts_empty_sequences() {
        let store = MemoryStore::new();
        store.create_or_replace("test").await.unwrap();
        store
            .add("test", Vec::new(), Vec::new(), Vec::new(), Vec::new())
            .await
            .unwrap();
        assert_eq!(store.count("test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_or_replace_wipes_existing() {
        let store = MemoryStore::new();
        populate(&store).await;
        assert_eq!(store.count("test").await.unwrap(), 10);
        store.create_or_replace("test").await.unwrap();
        assert_eq!(store.count("test").await.unwrap(), 0);
    }
}
