//! Embedding providers.
//!
//! The router treats every provider failure the same way: the embedding
//! signal is unavailable for that call and the ensemble rebalances. The
//! error variants exist for logging, not for control flow upstream.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Embedding provider failure modes.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Cannot connect to embedding provider at {0}")]
    ConnectionFailed(String),

    #[error("Embedding request timed out after {0}ms")]
    Timeout(u64),

    #[error("Provider error: {0}")]
    Api(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// A source of dense task vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Any transport, parse or timeout failure is an
    /// error; the caller decides whether to degrade or surface it.
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Model identifier, for diagnostics.
    fn model_name(&self) -> &str;
}

/// Configuration for the Ollama embedding endpoint.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: "mistral:latest".to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Embedding provider backed by a local Ollama instance.
pub struct OllamaProvider {
    endpoint: String,
    config: OllamaConfig,
    client: reqwest::blocking::Client,
}

impl OllamaProvider {
    /// Create a provider for the given endpoint.
    pub fn new(endpoint: &str, config: OllamaConfig) -> EmbeddingResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EmbeddingError::Api(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            config,
            client,
        })
    }

    /// Provider at the default localhost endpoint.
    pub fn localhost() -> EmbeddingResult<Self> {
        Self::new("http://localhost:11434", OllamaConfig::default())
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EmbeddingProvider for OllamaProvider {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt: text.to_string(),
        };

        let url = format!("{}/api/embeddings", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    EmbeddingError::ConnectionFailed(self.endpoint.clone())
                } else if e.is_timeout() {
                    EmbeddingError::Timeout(self.config.timeout_ms)
                } else {
                    EmbeddingError::Api(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let resp: OllamaResponse = response
            .json()
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if resp.embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse(
                "empty embedding in response".to_string(),
            ));
        }
        Ok(resp.embedding)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_normalised() {
        let provider =
            OllamaProvider::new("http://localhost:11434/", OllamaConfig::default()).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434");
        assert_eq!(provider.model_name(), "mistral:latest");
    }

    #[test]
    fn model_override() {
        let provider = OllamaProvider::localhost().unwrap().with_model("nomic-embed-text");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }
}
