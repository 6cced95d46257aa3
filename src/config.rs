use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chroma: ChromaConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    /// Extracted plain-text of the regulation (input of `rgpd chunk`).
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,
    /// Chunk JSON artifact (output of `chunk`, input of `index`).
    #[serde(default = "default_chunks_path")]
    pub chunks_path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            chunks_path: default_chunks_path(),
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from("rgpd/rgpd.txt")
}
fn default_chunks_path() -> PathBuf {
    PathBuf::from("rgpd_chunks.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            timeout_secs: default_embed_timeout(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_embedding_model() -> String {
    "bge-m3".to_string()
}
fn default_batch_size() -> usize {
    32
}
fn default_embed_timeout() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChromaConfig {
    #[serde(default = "default_chroma_url")]
    pub base_url: String,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_chroma_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: default_chroma_url(),
            tenant: default_tenant(),
            database: default_database(),
            collection: default_collection(),
            timeout_secs: default_chroma_timeout(),
        }
    }
}

fn default_chroma_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_tenant() -> String {
    "default_tenant".to_string()
}
fn default_database() -> String {
    "default_database".to_string()
}
fn default_collection() -> String {
    "rgpd_bge".to_string()
}
fn default_chroma_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            base_url: default_ollama_url(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_model() -> String {
    "mistral:7b".to_string()
}
fn default_llm_timeout() -> u64 {
    300
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }
    if config.embedding.model.trim().is_empty() {
        anyhow::bail!("embedding.model must not be empty");
    }
    if config.chroma.collection.trim().is_empty() {
        anyhow::bail!("chroma.collection must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(content: &str) -> Result<Config> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        load_config(file.path())
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = load_str("").unwrap();
        assert_eq!(cfg.embedding.model, "bge-m3");
        assert_eq!(cfg.chroma.collection, "rgpd_bge");
        assert_eq!(cfg.retrieval.top_k, 3);
    }

    #[test]
    fn test_overrides_apply() {
        let cfg = load_str(
            r#"
[embedding]
model = "nomic-embed-text"
batch_size = 8

[retrieval]
top_k = 5
"#,
        )
        .unwrap();
        assert_eq!(cfg.embedding.model, "nomic-embed-text");
        assert_eq!(cfg.embedding.batch_size, 8);
        assert_eq!(cfg.retrieval.top_k, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load_str("[retrieval]\ntop_k = 0\n").is_err());
        assert!(load_str("[embedding]\nbatch_size = 0\n").is_err());
        assert!(load_str("[embedding]\nmodel = \"\"\n").is_err());
    }
}
