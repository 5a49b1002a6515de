// Context-grounded Q&A over an in-memory document store
//
// Documents are embedded once at indexing time; a question is embedded,
// the top-k documents by cosine similarity become the prompt context.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::llm::{ChatModel, ChatRequest, Embedder};

const QA_SYSTEM: &str = "You answer questions strictly based on the provided context.";

fn qa_prompt(context: &str, question: &str) -> String {
    format!(
        "You should answer the question based on the below context.\n\n\
         Context: {context}\n\
         Question: {question}"
    )
}

/// Cosine similarity; zero-norm vectors (and mismatched lengths) score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

struct StoredDocument {
    text: String,
    embedding: Vec<f32>,
}

/// In-memory vector store
#[derive(Default)]
pub struct DocumentStore {
    rows: Vec<StoredDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add(&mut self, text: impl Into<String>, embedding: Vec<f32>) {
        self.rows.push(StoredDocument {
            text: text.into(),
            embedding,
        });
    }

    /// Top-k documents by cosine similarity, best first
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<(f32, &str)> {
        let mut scored: Vec<(f32, &str)> = self
            .rows
            .iter()
            .map(|row| (cosine_similarity(query, &row.embedding), row.text.as_str()))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }
}

/// Retrieval-augmented question answering
pub struct RetrievalQa {
    chat: Arc<dyn ChatModel>,
    embedder: Arc<dyn Embedder>,
    store: DocumentStore,
    top_k: usize,
}

impl RetrievalQa {
    pub fn new(chat: Arc<dyn ChatModel>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            chat,
            embedder,
            store: DocumentStore::new(),
            top_k: 4,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    /// Embed and index documents
    pub async fn add_documents(&mut self, texts: &[String]) -> Result<()> {
        if texts.is_empty() {
            return Ok(());
        }
        let embeddings = self
            .embedder
            .embed(texts)
            .await
            .context("Document embedding failed")?;
        for (text, embedding) in texts.iter().zip(embeddings) {
            self.store.add(text.clone(), embedding);
        }
        Ok(())
    }

    /// Answer a question grounded in the indexed documents
    pub async fn ask(&self, question: &str) -> Result<String> {
        if self.store.is_empty() {
            anyhow::bail!("No documents indexed; call add_documents first");
        }

        let query = self
            .embedder
            .embed(&[question.to_string()])
            .await
            .context("Question embedding failed")?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Embedder returned no vector for the question"))?;

        let hits = self.store.search(&query, self.top_k);
        let context = hits
            .iter()
            .map(|(_, text)| *text)
            .collect::<Vec<_>>()
            .join("\n---\n");

        let response = self
            .chat
            .chat(&ChatRequest::from_prompts(
                QA_SYSTEM,
                qa_prompt(&context, question),
            ))
            .await?;
        Ok(response.text().trim().to_string())
    }
}
