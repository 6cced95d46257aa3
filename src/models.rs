//! Core data models for the RGPD retrieval pipeline.
//!
//! These types represent the addressable units of the regulation
//! (considérants and articles), the metadata mirrored into the vector
//! store, and the scored results that flow back out at query time.
//!
//! Serialized field names keep the French vocabulary of the chunk file
//! (`type`, `numero`, `titre`, `contenu`) so the artifact produced by
//! `rgpd chunk` is stable and human-readable.

use serde::{Deserialize, Serialize};

/// The two kinds of addressable units in the regulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChunkKind {
    /// A recital from the preamble — numbered `(N)` in the source text.
    #[serde(rename = "considérant")]
    Recital,
    /// An article from the enacting terms.
    #[serde(rename = "article")]
    Article,
}

impl ChunkKind {
    /// French display label, matching the chunk-file vocabulary.
    pub fn label(&self) -> &'static str {
        match self {
            ChunkKind::Recital => "considérant",
            ChunkKind::Article => "article",
        }
    }

    /// Stable id prefix (ASCII, no accents).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ChunkKind::Recital => "considerant",
            ChunkKind::Article => "article",
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The atomic retrievable unit: one considérant or one article.
///
/// Immutable after creation; the whole collection is rebuilt wholesale
/// when the document is re-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "contenu")]
    pub body: String,
    pub id: String,
}

impl Chunk {
    /// Build a chunk, deriving `title` and `id` from `kind` + `number`.
    ///
    /// The id (`considerant_12`, `article_5`, ...) is the primary key in
    /// the vector store and must stay a pure function of kind and number.
    pub fn new(kind: ChunkKind, number: u32, body: impl Into<String>) -> Self {
        let title = match kind {
            ChunkKind::Recital => format!("Considérant {}", number),
            ChunkKind::Article => format!("Article {}", number),
        };
        let id = format!("{}_{}", kind.id_prefix(), number);
        Chunk {
            kind,
            number,
            title,
            body: body.into(),
            id,
        }
    }

    /// The exact text sent to the embedding model and stored as the
    /// collection document: title and body, blank-line separated.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }

    /// Metadata mirror stored alongside the vector.
    pub fn meta(&self) -> ChunkMeta {
        ChunkMeta {
            kind: self.kind,
            number: self.number,
            title: self.title.clone(),
        }
    }
}

/// Metadata stored next to each vector so results can be filtered and
/// displayed without re-fetching the chunk body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "titre")]
    pub title: String,
}

/// A scored retrieval result. Ephemeral — produced per query, consumed
/// immediately by the caller.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Chunk id (`considerant_N` / `article_N`).
    pub id: String,
    /// Metadata mirror from the store.
    pub meta: ChunkMeta,
    /// The stored document text (title + body).
    pub text: String,
    /// Cosine similarity, `1 - distance`, in `(-1, 1]`.
    pub score: f32,
}
