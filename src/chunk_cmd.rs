//! `rgpd chunk` command: segment the regulation and write the chunk file.

use anyhow::{Context, Result};

use crate::chunk_file;
use crate::config::Config;
use crate::models::ChunkKind;
use crate::segment::{segment, BoundaryMode};

pub fn run_chunk(config: &Config) -> Result<()> {
    let source = &config.document.source_path;
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read regulation text: {}", source.display()))?;

    println!("Segmenting {}...", source.display());
    let result = segment(&text);

    let recitals = result
        .chunks
        .iter()
        .filter(|c| c.kind == ChunkKind::Recital)
        .count();
    let articles = result.chunks.len() - recitals;

    println!("  considérants: {}", recitals);
    println!("  articles: {}", articles);
    println!("  boundary: {}", result.boundary);

    if result.boundary == BoundaryMode::WholeText {
        eprintln!("Warning: no recital/article boundary found — scanned the whole text");
    }
    if !result.missing_articles.is_empty() {
        eprintln!(
            "Warning: missing article numbers: {:?}",
            result.missing_articles
        );
    }

    chunk_file::save_chunks(&config.document.chunks_path, &result.chunks)?;
    println!(
        "{} chunks written to {}",
        result.chunks.len(),
        config.document.chunks_path.display()
    );
    Ok(())
}
