//! Chroma vector store client with Mistral embeddings
//!
//! Queries a Chroma collection over HTTP. Chroma expects the caller to
//! embed the query text, so the client carries an embeddings service.

use super::{Document, ExternalError, ExternalResult, VectorStore};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const EMBEDDINGS_URL: &str = "https://api.mistral.ai/v1/embeddings";

/// Mistral embeddings client
pub struct MistralEmbeddings {
    client: Client,
    api_key: String,
    model: String,
}

impl MistralEmbeddings {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_key,
            model: model.into(),
        }
    }

    pub async fn embed(&self, text: &str) -> ExternalResult<Vec<f32>> {
        let request = EmbeddingsRequest {
            model: self.model.clone(),
            input: vec![text.to_string()],
        };

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExternalError::Provider {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ExternalError::Malformed("embeddings response had no data".into()))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Chroma collection client
pub struct ChromaStore {
    client: Client,
    base_url: String,
    collection_id: String,
    embeddings: MistralEmbeddings,
}

impl ChromaStore {
    pub fn new(
        base_url: impl Into<String>,
        collection_id: impl Into<String>,
        embeddings: MistralEmbeddings,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            collection_id: collection_id.into(),
            embeddings,
        }
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn similarity_search(&self, query: &str, k: usize) -> ExternalResult<Vec<Document>> {
        let embedding = self.embeddings.embed(query).await?;

        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url.trim_end_matches('/'),
            self.collection_id
        );
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results: k,
            include: vec!["documents".to_string(), "metadatas".to_string()],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExternalError::Provider {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: QueryResponse = response.json().await?;
        let contents = parsed.documents.into_iter().next().unwrap_or_default();
        let mut metadatas = parsed
            .metadatas
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter();

        Ok(contents
            .into_iter()
            .map(|content| Document {
                content,
                metadata: metadatas
                    .next()
                    .flatten()
                    .unwrap_or(serde_json::Value::Null),
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<String>,
}

/// Chroma answers per-query lists; we only ever send one query.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<String>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<serde_json::Value>>>,
}
