//! Index management through the Pinecone control plane

use crate::http::{describe_send_error, read_json};
use crate::retriever::PINECONE_API_VERSION;
use crate::types::{IndexDescription, RagError, RagResult};
use reqwest::{Client, StatusCode};
use scholarly_core::{retry_async, upstream_error, PineconeSettings, RetryConfig, Secret};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: serde_json::Value,
}

/// Control-plane client: describe, list and create indexes
pub struct IndexManager {
    client: Client,
    controller_url: String,
    api_key: Secret,
}

impl IndexManager {
    pub fn new(client: Client, settings: &PineconeSettings) -> Self {
        Self {
            client,
            controller_url: settings.controller_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.controller_url, path))
            .header("Api-Key", self.api_key.expose())
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
    }

    /// Describe an index, returning `None` when it does not exist
    pub async fn describe_index(&self, name: &str) -> RagResult<Option<IndexDescription>> {
        let response = self
            .request(reqwest::Method::GET, &format!("/indexes/{}", name))
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_send_error("Pinecone control plane", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        read_json("Pinecone control plane", response)
            .await
            .map(Some)
            .map_err(RagError::Retrieval)
    }

    /// Names of all indexes in the project
    pub async fn list_indexes(&self) -> RagResult<Vec<String>> {
        let response = self
            .request(reqwest::Method::GET, "/indexes")
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_send_error("Pinecone control plane", e)))?;

        let list: IndexList = read_json("Pinecone control plane", response)
            .await
            .map_err(RagError::Retrieval)?;

        Ok(list.indexes.into_iter().map(|index| index.name).collect())
    }

    /// Create a serverless cosine index on AWS in `region`
    pub async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        region: &str,
    ) -> RagResult<IndexDescription> {
        info!(index = name, dimension, region, "Creating vector index");

        let request = CreateIndexRequest {
            name,
            dimension,
            metric: "cosine",
            spec: json!({ "serverless": { "cloud": "aws", "region": region } }),
        };

        let response = self
            .request(reqwest::Method::POST, "/indexes")
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Retrieval(describe_send_error("Pinecone control plane", e)))?;

        read_json("Pinecone control plane", response)
            .await
            .map_err(RagError::Retrieval)
    }

    /// Return the index description, creating the index first when missing.
    ///
    /// A freshly created index is polled with `wait` until it reports ready.
    pub async fn ensure_index(
        &self,
        name: &str,
        dimension: usize,
        region: &str,
        wait: &RetryConfig,
    ) -> RagResult<IndexDescription> {
        if let Some(existing) = self.describe_index(name).await? {
            debug!(index = name, dimension = existing.dimension, "Index already exists");
            if existing.is_ready() {
                return Ok(existing);
            }
        } else {
            let created = self.create_index(name, dimension, region).await?;
            if created.is_ready() {
                return Ok(created);
            }
        }

        retry_async(
            move || async move {
                match self.describe_index(name).await? {
                    Some(description) if description.is_ready() => Ok(description),
                    Some(_) => Err(RagError::from(upstream_error!(
                        "pinecone",
                        format!("index {} is not ready yet", name),
                        "index_manager"
                    ))),
                    None => Err(RagError::Ingestion(format!("index {} not found", name))),
                }
            },
            wait,
            "wait_for_index",
        )
        .await
    }
}
