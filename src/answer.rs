//! Answer composer: grounding prompt assembly and LLM generation.
//!
//! Thin orchestration around the retrieval core. The prompt instructs
//! the model to answer in French, citing only the retrieved articles
//! and considérants. Retrieval and LLM failures (Ollama or Chroma not
//! running, non-success status) are caught at this boundary and
//! reported — the pipeline yields "no answer" instead of crashing.

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::embedding::{Embedder, OllamaEmbedder};
use crate::models::SearchHit;
use crate::search::retrieve;
use crate::store::chroma::ChromaStore;
use crate::store::VectorStore;

/// Assemble the grounding prompt from the question and retrieved hits.
///
/// Each hit contributes a `[titre]` block with its stored text; the
/// instructions pin the model to the provided context and to explicit
/// article/considérant citations.
pub fn build_prompt(question: &str, hits: &[SearchHit]) -> String {
    let contexte = hits
        .iter()
        .map(|hit| format!("[{}]\n{}", hit.meta.title, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Tu es un assistant juridique expert du RGPD. Réponds à la question en te basant \
         UNIQUEMENT sur le contexte fourni ci-dessous.\n\
         \n\
         CONTEXTE:\n\
         {contexte}\n\
         \n\
         QUESTION: {question}\n\
         \n\
         INSTRUCTIONS:\n\
         - Réponds en français de manière claire et précise\n\
         - CITE EXPLICITEMENT les numéros d'articles et de considérants utilisés dans ta réponse\n\
         - Utilise le format \"selon l'Article X\" ou \"comme indiqué au Considérant Y\"\n\
         - Structure ta réponse avec les références juridiques\n\
         - Ne mentionne AUCUNE information qui ne figure pas dans le contexte fourni\n\
         \n\
         RÉPONSE:"
    )
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Call Ollama's `/api/generate` with the fully assembled prompt.
pub async fn generate(config: &Config, prompt: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.llm.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": config.llm.model,
        "prompt": prompt,
        "stream": false,
    });

    let resp = client
        .post(format!(
            "{}/api/generate",
            config.llm.base_url.trim_end_matches('/')
        ))
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Failed to reach Ollama at {}", config.llm.base_url))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        bail!("Ollama generate error {}: {}", status, text);
    }

    let parsed: GenerateResponse = resp
        .json()
        .await
        .context("Invalid Ollama generate response")?;
    Ok(parsed.response)
}

/// Retrieve, compose, generate, print. Returns the answer when the
/// whole pipeline succeeded, `None` otherwise (already reported).
///
/// Both external collaborators sit behind this boundary: a failing
/// retrieval (embedder or store down) and a failing LLM call are each
/// surfaced on stderr, never propagated as a crash.
async fn answer_question(
    config: &Config,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    question: &str,
) -> Option<String> {
    println!("1. Searching relevant chunks...");
    let hits = match retrieve(
        embedder,
        store,
        &config.chroma.collection,
        question,
        config.retrieval.top_k,
    )
    .await
    {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("Warning: retrieval failed: {}", e);
            eprintln!("Make sure Ollama and Chroma are running and the collection is indexed.");
            return None;
        }
    };

    if hits.is_empty() {
        println!("   no chunks found — is the collection indexed?");
        return None;
    }

    for (i, hit) in hits.iter().enumerate() {
        let excerpt: String = hit.text.chars().take(200).collect();
        println!(
            "   {}. {} (similarity: {:.4})",
            i + 1,
            hit.meta.title,
            hit.score
        );
        println!("      {}...", excerpt);
    }

    let prompt = build_prompt(question, &hits);
    println!("\n2. Prompt assembled ({} characters)", prompt.chars().count());
    println!("3. Generating answer with {}...\n", config.llm.model);

    match generate(config, &prompt).await {
        Ok(answer) => {
            println!("{}", "-".repeat(60));
            println!("{}", answer);
            println!("{}", "-".repeat(60));
            Some(answer)
        }
        Err(e) => {
            eprintln!("Warning: LLM call failed: {}", e);
            eprintln!("Make sure Ollama is running: ollama run {}", config.llm.model);
            None
        }
    }
}

/// CLI entry point for `rgpd ask`.
///
/// One-shot when a question is given; otherwise an interactive loop
/// reading questions from stdin until `quit`, `exit`, or `q`.
pub async fn run_ask(config: &Config, question: Option<String>) -> Result<()> {
    let embedder = OllamaEmbedder::new(&config.embedding)?;
    let store = ChromaStore::new(&config.chroma)?;

    if let Some(q) = question {
        answer_question(config, &embedder, &store, &q).await;
        return Ok(());
    }

    println!("RAG interactif — RGPD");
    println!("Posez votre question (ou 'quit' pour quitter)\n");

    loop {
        print!("Question: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();

        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Au revoir !");
            break;
        }
        if question.is_empty() {
            eprintln!("Warning: empty question, try again.");
            continue;
        }

        answer_question(config, &embedder, &store, question).await;
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkKind, ChunkMeta};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;

    fn hit(n: u32, text: &str) -> SearchHit {
        SearchHit {
            id: format!("article_{}", n),
            meta: ChunkMeta {
                kind: ChunkKind::Article,
                number: n,
                title: format!("Article {}", n),
            },
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_prompt_contains_context_blocks_and_question() {
        let hits = vec![hit(15, "Droit d'accès"), hit(17, "Droit à l'effacement")];
        let prompt = build_prompt("Comment supprimer mes données ?", &hits);

        assert!(prompt.contains("[Article 15]\nDroit d'accès"));
        assert!(prompt.contains("[Article 17]\nDroit à l'effacement"));
        assert!(prompt.contains("QUESTION: Comment supprimer mes données ?"));
        assert!(prompt.contains("UNIQUEMENT"));
        // Context precedes the question.
        assert!(prompt.find("[Article 15]").unwrap() < prompt.find("QUESTION:").unwrap());
    }

    #[test]
    fn test_prompt_with_no_hits_has_empty_context() {
        let prompt = build_prompt("Question ?", &[]);
        assert!(prompt.contains("CONTEXTE:\n\n"));
        assert!(prompt.contains("QUESTION: Question ?"));
    }

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        fn model_name(&self) -> &str {
            "down"
        }

        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            bail!("connection refused")
        }
    }

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        fn model_name(&self) -> &str {
            "unit"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[tokio::test]
    async fn test_embedder_failure_yields_no_answer() {
        let config = Config::default();
        let store = MemoryStore::new();
        let out = answer_question(&config, &DownEmbedder, &store, "Quels sont mes droits ?").await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn test_store_failure_yields_no_answer() {
        let config = Config::default();
        // The configured collection was never created, so the store
        // rejects the query.
        let store = MemoryStore::new();
        let out = answer_question(&config, &UnitEmbedder, &store, "Quels sont mes droits ?").await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn test_empty_collection_yields_no_answer_without_llm_call() {
        let config = Config::default();
        let store = MemoryStore::new();
        store.create_or_replace(&config.chroma.collection).await.unwrap();
        let out = answer_question(&config, &UnitEmbedder, &store, "Quels sont mes droits ?").await;
        assert_eq!(out, None);
    }
}
