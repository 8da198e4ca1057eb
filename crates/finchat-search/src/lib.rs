//! finchat Search - query embeddings and intent similarity search
//!
//! - `EmbeddingProvider` / `HuggingFaceEmbedder`: text → 768-float vector
//! - `SimilaritySearch` / `MilvusSearchClient`: vector → top-k intent ids
//!
//! # Architecture
//!
//! ```text
//! prompt ──▶ HuggingFaceEmbedder ──▶ [f32; 768] ──▶ MilvusSearchClient ──▶ ["card_arrival", ...]
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod embedding;
pub mod error;
pub mod milvus;

pub use embedding::{
    check_dimensions, EmbeddingConfig, EmbeddingProvider, HuggingFaceEmbedder,
    EMBEDDING_DIMENSIONS,
};
pub use error::{Error, Result};
pub use milvus::{
    validate_query, ConsistencyLevel, MetricType, MilvusConfig, MilvusSearchClient, SearchHit,
    SimilaritySearch,
};
