//! JSON persistence of the chunk collection.
//!
//! The chunk file is the sole intermediate artifact between `rgpd chunk`
//! and `rgpd index` (separate runs): a pretty-printed JSON array of
//! chunk records with the French field vocabulary (`type`, `numero`,
//! `titre`, `contenu`, `id`). Saving and reloading is lossless.

use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Chunk;

/// Write the chunk collection to `path` as pretty JSON.
pub fn save_chunks(path: &Path, chunks: &[Chunk]) -> Result<()> {
    let json = serde_json::to_string_pretty(chunks)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write chunk file: {}", path.display()))?;
    Ok(())
}

/// Load a chunk collection previously written by [`save_chunks`].
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunk file: {}", path.display()))?;
    let chunks: Vec<Chunk> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse chunk file: {}", path.display()))?;
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkKind;
    use tempfile::TempDir;

    fn sample() -> Vec<Chunk> {
        vec![
            Chunk::new(ChunkKind::Recital, 1, "Un considérant suffisamment long."),
            Chunk::new(ChunkKind::Article, 12, "Transparence des informations."),
        ]
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chunks.json");

        let original = sample();
        save_chunks(&path, &original).unwrap();
        let loaded = load_chunks(&path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_round_trip_is_byte_stable() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a.json");
        let second = tmp.path().join("b.json");

        save_chunks(&first, &sample()).unwrap();
        let reloaded = load_chunks(&first).unwrap();
        save_chunks(&second, &reloaded).unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_uses_french_field_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chunks.json");
        save_chunks(&path, &sample()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        for field in ["\"type\"", "\"numero\"", "\"titre\"", "\"contenu\"", "\"id\""] {
            assert!(raw.contains(field), "missing field {}", field);
        }
        assert!(raw.contains("considérant"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_chunks(Path::new("/nonexistent/chunks.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chunks.json"));
    }
}
