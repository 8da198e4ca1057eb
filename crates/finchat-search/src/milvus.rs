//! Similarity search against a Milvus collection (REST v2 API)
//!
//! Queries the bank-intent collection for the nearest neighbours of a query
//! embedding and returns the matched entity ids in rank order.

use crate::embedding::EMBEDDING_DIMENSIONS;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Collection holding the banking77 intent embeddings
pub const DEFAULT_COLLECTION: &str = "banking77_embeddings";

/// Trait for nearest-neighbour lookups
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Return the ids of the closest entities, best match first
    async fn search(&self, vector: &[f32]) -> Result<Vec<String>>;
}

/// Similarity metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MetricType {
    /// Inner product
    #[default]
    #[serde(rename = "IP")]
    InnerProduct,
    /// Cosine similarity
    #[serde(rename = "COSINE")]
    Cosine,
    /// Euclidean distance
    L2,
}

/// Read consistency requested from the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConsistencyLevel {
    /// Reads may lag the latest writes by a bounded interval
    #[default]
    Bounded,
    /// Reads see every write
    Strong,
    /// Reads see the caller's own writes
    Session,
    /// No guarantee
    Eventually,
}

/// Configuration for [`MilvusSearchClient`]
#[derive(Clone)]
pub struct MilvusConfig {
    /// Base address, e.g. `https://in03-xxx.api.gcp-us-west1.zillizcloud.com`
    pub address: String,
    /// API token
    pub token: String,
    /// Collection name
    pub collection: String,
    /// Vector field searched
    pub anns_field: String,
    /// Scalar field returned with each hit
    pub output_field: String,
    /// Number of neighbours
    pub top_k: usize,
    /// IVF probe count
    pub nprobe: u32,
    /// Metric
    pub metric: MetricType,
    /// Consistency level
    pub consistency: ConsistencyLevel,
    /// Expected query dimensions
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for MilvusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MilvusConfig")
            .field("address", &self.address)
            .field("token", &"[REDACTED]")
            .field("collection", &self.collection)
            .field("top_k", &self.top_k)
            .field("nprobe", &self.nprobe)
            .field("metric", &self.metric)
            .field("consistency", &self.consistency)
            .finish()
    }
}

impl MilvusConfig {
    /// Defaults for the banking77 intent collection
    #[must_use]
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            anns_field: "vector".to_string(),
            output_field: "intent".to_string(),
            top_k: 5,
            nprobe: 16,
            metric: MetricType::InnerProduct,
            consistency: ConsistencyLevel::Bounded,
            dimensions: EMBEDDING_DIMENSIONS,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the collection name
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Override the neighbour count
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Override the probe count
    #[must_use]
    pub fn with_nprobe(mut self, nprobe: u32) -> Self {
        self.nprobe = nprobe;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    collection_name: &'a str,
    data: Vec<&'a [f32]>,
    anns_field: &'a str,
    limit: usize,
    output_fields: Vec<&'a str>,
    search_params: SearchParams,
    consistency_level: ConsistencyLevel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    metric_type: MetricType,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Vec<SearchHit>,
}

/// One nearest-neighbour hit
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Primary key (string or integer in the collection)
    pub id: serde_json::Value,
    /// Similarity under the configured metric
    #[serde(default)]
    pub distance: f32,
    /// Remaining output fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SearchHit {
    /// Primary key rendered as text
    #[must_use]
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Reject empty vectors and vectors whose length differs from `dimensions`
pub fn validate_query(vector: &[f32], dimensions: usize) -> Result<()> {
    if vector.is_empty() || vector.len() != dimensions {
        return Err(Error::InvalidQuery(format!(
            "Query embedding is invalid or does not have {} dimensions (got {}).",
            dimensions,
            vector.len()
        )));
    }
    Ok(())
}

/// Milvus / Zilliz Cloud REST client
pub struct MilvusSearchClient {
    client: reqwest::Client,
    config: MilvusConfig,
}

impl MilvusSearchClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns error if the address is empty or the HTTP client cannot be built
    pub fn new(config: MilvusConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(Error::NotConfigured("MILVUS_ADDRESS is required".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Search(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn build_request<'a>(&'a self, vector: &'a [f32]) -> SearchRequest<'a> {
        SearchRequest {
            collection_name: &self.config.collection,
            data: vec![vector],
            anns_field: &self.config.anns_field,
            limit: self.config.top_k,
            output_fields: vec![self.config.output_field.as_str()],
            search_params: SearchParams {
                metric_type: self.config.metric,
                params: serde_json::json!({ "nprobe": self.config.nprobe }),
            },
            consistency_level: self.config.consistency,
        }
    }

    /// Full hits, including distance and output fields
    ///
    /// # Errors
    /// `InvalidQuery` for a malformed vector, `Search` for remote failures
    #[instrument(skip(self, vector), fields(collection = %self.config.collection))]
    pub async fn search_hits(&self, vector: &[f32]) -> Result<Vec<SearchHit>> {
        validate_query(vector, self.config.dimensions)?;

        let url = format!(
            "{}/v2/vectordb/entities/search",
            self.config.address.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&self.build_request(vector))
            .send()
            .await
            .map_err(|e| Error::Search(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Milvus search failed");
            return Err(Error::Search(format!("HTTP {}", status)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        if body.code != 0 {
            return Err(Error::Search(format!(
                "code {}: {}",
                body.code,
                body.message.unwrap_or_default()
            )));
        }

        debug!(hits = body.data.len(), "Milvus search results");
        Ok(body.data)
    }
}

#[async_trait]
impl SimilaritySearch for MilvusSearchClient {
    async fn search(&self, vector: &[f32]) -> Result<Vec<String>> {
        let hits = self.search_hits(vector).await?;
        Ok(hits.iter().map(SearchHit::id_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MilvusSearchClient {
        MilvusSearchClient::new(MilvusConfig::new("http://localhost:19530", "root:Milvus")).unwrap()
    }

    #[test]
    fn test_validate_query() {
        assert!(validate_query(&vec![0.0; 768], 768).is_ok());
        assert!(matches!(validate_query(&[], 768), Err(Error::InvalidQuery(_))));
        assert!(matches!(
            validate_query(&vec![0.0; 512], 768),
            Err(Error::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_search_rejects_bad_vector_before_any_request() {
        let err = client().search(&[1.0, 2.0]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let vector = vec![0.5_f32; 768];
        let json = serde_json::to_value(client.build_request(&vector)).unwrap();

        assert_eq!(json["collectionName"], "banking77_embeddings");
        assert_eq!(json["limit"], 5);
        assert_eq!(json["outputFields"][0], "intent");
        assert_eq!(json["searchParams"]["metricType"], "IP");
        assert_eq!(json["searchParams"]["params"]["nprobe"], 16);
        assert_eq!(json["consistencyLevel"], "Bounded");
        assert_eq!(json["data"][0].as_array().unwrap().len(), 768);
    }

    #[test]
    fn test_hits_keep_rank_order_and_stringify_ids() {
        let body = r#"{
            "code": 0,
            "data": [
                {"id": "card_arrival", "distance": 0.91, "intent": "card_arrival"},
                {"id": 42, "distance": 0.80, "intent": "lost_or_stolen_card"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let ids: Vec<String> = parsed.data.iter().map(SearchHit::id_string).collect();

        assert_eq!(ids, vec!["card_arrival", "42"]);
        assert_eq!(parsed.data[1].fields["intent"], "lost_or_stolen_card");
    }

    #[test]
    fn test_empty_address_is_not_configured() {
        let err = MilvusSearchClient::new(MilvusConfig::new("", "t")).err().unwrap();
        assert!(matches!(err, Error::NotConfigured(_)));
    }
}
