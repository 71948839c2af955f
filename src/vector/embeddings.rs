use crate::{
    config::ProviderConfig,
    error::{Result, SproutError},
    services::openai_client::OpenAIClient,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

/// Turns text into vectors
#[async_trait]
pub trait Embeddings: Send + Sync + std::fmt::Debug {
    /// Embed a batch of documents, one vector per input, in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            SproutError::VectorStore("Embedding provider returned no vector".to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddings {
    client: OpenAIClient,
    model: String,
    timeout: Duration,
}

impl OpenAIEmbeddings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.api_key.clone(), config.embedding_model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embeddings for OpenAIEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let response = timeout(self.timeout, self.client.embeddings(&body, self.timeout))
            .await
            .map_err(|_| {
                SproutError::Timeout(format!(
                    "Embedding request did not finish within {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let parsed: EmbeddingResponse = serde_path_to_error::deserialize(response)
            .map_err(|err| {
                SproutError::UnexpectedResponse(format!(
                    "Embedding response malformed at {}: {}",
                    err.path(),
                    err
                ))
            })?;

        let mut rows = parsed.data;
        if rows.len() != texts.len() {
            return Err(SproutError::VectorStore(format!(
                "Asked for {} embeddings, provider returned {}",
                texts.len(),
                rows.len()
            )));
        }
        // Rows without an index keep their response position.
        rows.sort_by_key(|row| row.index.unwrap_or(usize::MAX));

        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }
}
