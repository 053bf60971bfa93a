//! Semantic search against a remote collection.
//!
//! The `method` string is passed through untouched; the remote service
//! decides which values it accepts. Results keep the endpoint's rank order.

use tracing::debug;

use crate::client::AlbertClient;
use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::models::{SearchChunk, SearchRequest, SearchResponse};

pub const DEFAULT_K: usize = 6;
pub const DEFAULT_METHOD: &str = "semantic";

/// How many chunks to retrieve and with which strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub k: usize,
    pub method: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            method: DEFAULT_METHOD.to_string(),
        }
    }
}

impl From<&RetrievalConfig> for SearchOptions {
    fn from(cfg: &RetrievalConfig) -> Self {
        Self {
            k: cfg.k,
            method: cfg.method.clone(),
        }
    }
}

/// Retrieve the top `k` chunks of `collection_id` relevant to `query`.
pub async fn search(
    client: &AlbertClient,
    collection_id: &str,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchChunk>> {
    let request = SearchRequest {
        collections: vec![collection_id],
        k: options.k,
        prompt: query,
        method: &options.method,
    };
    let response: SearchResponse = client.post_json("search", &request).await?;
    debug!(hits = response.data.len(), "search complete");
    Ok(response.data.into_iter().map(|hit| hit.chunk).collect())
}
