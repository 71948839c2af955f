// In-memory vector store. Everything lives for the lifetime of the value;
// nothing is written to disk.

use super::embeddings::Embeddings;
use crate::error::{Result, SproutError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{cmp::Ordering, sync::Arc};
use tracing::debug;

/// Number of matches returned when the caller has no preference
pub const DEFAULT_K: usize = 4;

/// A stored text and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone)]
struct Entry {
    document: Document,
    vector: Vec<f32>,
}

/// Documents indexed by embedding, searched by cosine similarity
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    embedding: Arc<dyn Embeddings>,
    entries: Vec<Entry>,
    dimension: Option<usize>,
}

impl InMemoryVectorStore {
    /// An empty store that will embed with `embedding`
    pub fn new(embedding: Arc<dyn Embeddings>) -> Self {
        Self {
            embedding,
            entries: Vec::new(),
            dimension: None,
        }
    }

    /// Embed `texts` and build a store holding them
    pub async fn from_texts<I, S>(texts: I, embedding: Arc<dyn Embeddings>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::new(embedding);
        store
            .add_documents(texts.into_iter().map(Document::new).collect())
            .await?;
        Ok(store)
    }

    /// Embed and add plain texts; returns how many were added
    pub async fn add_texts<I, S>(&mut self, texts: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_documents(texts.into_iter().map(Document::new).collect())
            .await
    }

    /// Embed and add documents; returns how many were added. On error
    /// nothing is added.
    pub async fn add_documents(&mut self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents
            .iter()
            .map(|document| document.page_content.clone())
            .collect();
        let vectors = self.embedding.embed_documents(&texts).await?;

        if vectors.len() != documents.len() {
            return Err(SproutError::VectorStore(format!(
                "Expected {} vectors, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        let mut dimension = self.dimension;
        for vector in &vectors {
            dimension = Some(check_vector(vector, dimension)?);
        }

        let added = documents.len();
        self.entries.extend(
            documents
                .into_iter()
                .zip(vectors)
                .map(|(document, vector)| Entry { document, vector }),
        );
        self.dimension = dimension;
        debug!(added, total = self.entries.len(), "Indexed documents");

        Ok(added)
    }

    /// The `k` documents most similar to `query`, best first
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        Ok(self
            .similarity_search_with_score(query, k)
            .await?
            .into_iter()
            .map(|(document, _)| document)
            .collect())
    }

    /// Like [`InMemoryVectorStore::similarity_search`], with each match's
    /// cosine similarity
    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedding.embed_query(query).await?;
        check_vector(&query_vector, self.dimension)?;

        Ok(self.rank(&query_vector, k))
    }

    fn rank(&self, query_vector: &[f32], k: usize) -> Vec<(Document, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, cosine_similarity(query_vector, &entry.vector)))
            .collect();

        // Highest score first; equal scores keep insertion order.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| (self.entries[idx].document.clone(), score))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimension shared by every stored vector, once anything is stored
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

fn check_vector(vector: &[f32], expected: Option<usize>) -> Result<usize> {
    if vector.is_empty() {
        return Err(SproutError::VectorStore("Empty embedding vector".to_string()));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(SproutError::VectorStore(
            "Embedding contains NaN or infinite values".to_string(),
        ));
    }
    match expected {
        Some(dimension) if dimension != vector.len() => Err(SproutError::VectorStore(format!(
            "Embedding dimension mismatch: expected {}, got {}",
            dimension,
            vector.len()
        ))),
        _ => Ok(vector.len()),
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 when either has zero
/// magnitude or the lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let magnitude_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        0.0
    } else {
        dot_product / (magnitude_a * magnitude_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Maps each text to a fixed vector by keyword
    #[derive(Debug)]
    struct KeywordEmbeddings;

    #[async_trait]
    impl Embeddings for KeywordEmbeddings {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let text = text.to_lowercase();
                    vec![
                        if text.contains("seedling") { 1.0 } else { 0.0 },
                        if text.contains("root") { 1.0 } else { 0.0 },
                        0.1,
                    ]
                })
                .collect())
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_check_vector() {
        assert_eq!(check_vector(&[1.0, 2.0], None).unwrap(), 2);
        assert!(check_vector(&[1.0, 2.0], Some(3)).is_err());
        assert!(check_vector(&[f32::NAN], None).is_err());
        assert!(check_vector(&[], None).is_err());
    }

    #[tokio::test]
    async fn test_ranks_by_similarity() {
        let store = InMemoryVectorStore::from_texts(
            [
                "Mature plants have established root systems.",
                "Seedlings need light, water, and nutrients to grow.",
            ],
            Arc::new(KeywordEmbeddings),
        )
        .await
        .unwrap();

        let results = store
            .similarity_search_with_score("What do seedlings need?", DEFAULT_K)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].0.page_content.starts_with("Seedlings"));
        assert!(results[0].1 > results[1].1);
    }

    #[tokio::test]
    async fn test_k_limits_and_empty_store() {
        let embedding: Arc<dyn Embeddings> = Arc::new(KeywordEmbeddings);
        let empty = InMemoryVectorStore::new(embedding.clone());
        assert!(empty.similarity_search("anything", 3).await.unwrap().is_empty());

        let mut store = InMemoryVectorStore::new(embedding);
        let added = store.add_texts(["a seedling", "b", "c"]).await.unwrap();
        assert_eq!(added, 3);
        assert_eq!(store.dimension(), Some(3));

        assert_eq!(store.similarity_search("seedling", 1).await.unwrap().len(), 1);
        assert!(store.similarity_search("seedling", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = InMemoryVectorStore::from_texts(["first", "second"], Arc::new(KeywordEmbeddings))
            .await
            .unwrap();
        let results = store.similarity_search("other", 2).await.unwrap();
        assert_eq!(results[0].page_content, "first");
        assert_eq!(results[1].page_content, "second");
    }
}
