//! Chroma REST backend for [`VectorStore`].
//!
//! Talks directly to Chroma's v1 HTTP API with reqwest — no wrapper
//! crate. Collections are addressed by name at the trait level and
//! resolved to their Chroma UUID per operation (this is a one-shot
//! batch tool; the extra list call per command is irrelevant).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ChromaConfig;
use crate::models::ChunkMeta;

use super::{check_aligned, QueryHit, StoredRecord, VectorStore};

#[derive(Debug, Clone, Deserialize)]
struct CollectionInfo {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChromaQueryResult {
    ids: Vec<Vec<String>>,
    documents: Option<Vec<Vec<Option<String>>>>,
    metadatas: Option<Vec<Vec<Option<Value>>>>,
    distances: Option<Vec<Vec<f32>>>,
}

#[derive(Debug, Deserialize)]
struct ChromaGetResult {
    ids: Vec<String>,
    documents: Option<Vec<Option<String>>>,
    metadatas: Option<Vec<Option<Value>>>,
    embeddings: Option<Vec<Vec<f32>>>,
}

/// Vector store backed by a Chroma server.
pub struct ChromaStore {
    http: reqwest::Client,
    base_url: String,
    tenant: String,
    database: String,
}

impl ChromaStore {
    pub fn new(config: &ChromaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
        })
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v1/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let resp = self
            .http
            .get(self.collections_url())
            .send()
            .await
            .with_context(|| format!("Failed to reach Chroma at {}", self.base_url))?;

        if !resp.status().is_success() {
            bail!("Chroma list collections failed: {}", resp.status());
        }
        resp.json().await.context("Invalid Chroma collections response")
    }

    /// Resolve a collection name to its Chroma UUID.
    async fn collection_id(&self, name: &str) -> Result<String> {
        self.list_collections()
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .ok_or_else(|| anyhow::anyhow!("Collection not found: {}", name))
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/{}", self.collections_url(), name))
            .send()
            .await?;

        // Absence is a no-op, not an error.
        if resp.status().as_u16() == 404 || resp.status().is_success() {
            Ok(())
        } else {
            bail!("Chroma delete collection failed: {}", resp.status());
        }
    }

    async fn count_by_id(&self, collection_id: &str) -> Result<usize> {
        let resp = self
            .http
            .get(format!(
                "{}/api/v1/collections/{}/count",
                self.base_url, collection_id
            ))
            .send()
            .await?;

        if !resp.status().is_success() {
            bail!("Chroma count failed: {}", resp.status());
        }
        resp.json().await.context("Invalid Chroma count response")
    }
}

fn parse_meta(value: Option<Value>) -> Result<ChunkMeta> {
    let value = value.unwrap_or(Value::Null);
    serde_json::from_value(value).context("Invalid chunk metadata in Chroma record")
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn create_or_replace(&self, collection: &str) -> Result<()> {
        self.delete_collection(collection).await?;

        let body = json!({
            "name": collection,
            "metadata": { "hnsw:space": "cosine" },
            "get_or_create": false,
        });

        let resp = self
            .http
            .post(self.collections_url())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach Chroma at {}", self.base_url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Chroma create collection failed ({}): {}", status, text);
        }
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
        if ids.is_empty() {
            // Chroma rejects an empty add payload; there is nothing to
            // send anyway.
            return Ok(());
        }

        let collection_id = self.collection_id(collection).await?;
        let body = json!({
            "ids": ids,
            "documents": documents,
            "embeddings": embeddings,
            "metadatas": metadatas,
        });

        let resp = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/add",
                self.base_url, collection_id
            ))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Chroma add failed ({}): {}", status, text);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let collection_id = self.collection_id(collection).await?;

        // Chroma rejects n_results above the stored count; clamp so a
        // small collection returns everything instead of erroring.
        let stored = self.count_by_id(&collection_id).await?;
        let n_results = k.min(stored);
        if n_results == 0 {
            return Ok(Vec::new());
        }

        let body = json!({
            "query_embeddings": [vector],
            "n_results": n_results,
            "include": ["documents", "metadatas", "distances"],
        });

        let resp = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.base_url, collection_id
            ))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Chroma query failed ({}): {}", status, text);
        }

        let result: ChromaQueryResult =
            resp.json().await.context("Invalid Chroma query response")?;

        // Single query vector — one row of each nested array.
        let ids = result.ids.into_iter().next().unwrap_or_default();
        let documents = result
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let metadatas = result
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();
        let distances = result
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();

        if documents.len() != ids.len() || metadatas.len() != ids.len() || distances.len() != ids.len()
        {
            bail!("Chroma query response fields are not aligned");
        }

        let mut hits = Vec::with_capacity(ids.len());
        for (((id, document), meta), distance) in ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .zip(distances)
        {
            hits.push(QueryHit {
                id,
                document: document.unwrap_or_default(),
                meta: parse_meta(meta)?,
                distance,
            });
        }
        Ok(hits)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collection_id = self.collection_id(collection).await?;
        self.count_by_id(&collection_id).await
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        let collection_id = self.collection_id(collection).await?;

        let body = json!({
            "include": ["documents", "metadatas", "embeddings"],
        });

        let resp = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/get",
                self.base_url, collection_id
            ))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Chroma get failed: {}", text);
        }

        let result: ChromaGetResult = resp.json().await.context("Invalid Chroma get response")?;

        let total = result.ids.len();
        let documents = result.documents.unwrap_or_default();
        let metadatas = result.metadatas.unwrap_or_default();
        let embeddings = result.embeddings.unwrap_or_default();
        if documents.len() != total || metadatas.len() != total || embeddings.len() != total {
            bail!("Chroma get response fields are not aligned");
        }

        let mut records = Vec::with_capacity(total);
        for (((id, document), meta), embedding) in result
            .ids
            .into_iter()
            .zip(documents)
            .zip(metadatas)
            .zip(embeddings)
        {
            records.push(StoredRecord {
                id,
                document: document.unwrap_or_default(),
                meta: parse_meta(meta)?,
                embedding,
            });
        }
        Ok(records)
    }
}
