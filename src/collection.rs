//! Remote collection membership and file upload.
//!
//! [`UploadTracker`] snapshots the collection's document names once, before
//! the ingest loop starts. The snapshot is never refreshed during a run.

use reqwest::multipart::{Form, Part};
use std::collections::HashSet;
use tracing::info;

use crate::client::AlbertClient;
use crate::convert::MIME_PDF;
use crate::error::{AlbertError, Result};
use crate::models::DocumentList;

/// Names of every document currently stored in `collection_id`.
pub async fn list_documents(client: &AlbertClient, collection_id: &str) -> Result<Vec<String>> {
    let list: DocumentList = client
        .get_json(&format!("documents/{}", collection_id))
        .await?;
    Ok(list.data.into_iter().map(|d| d.name).collect())
}

/// Upload one converted document into `collection_id`.
pub async fn upload_document(
    client: &AlbertClient,
    collection_id: &str,
    name: &str,
    bytes: Vec<u8>,
) -> Result<()> {
    let request = serde_json::json!({ "collection": collection_id }).to_string();
    let file = file_part(name, bytes, MIME_PDF)?;
    let form = Form::new().text("request", request).part("file", file);
    client.post_multipart("files", form).await
}

fn file_part(name: &str, bytes: Vec<u8>, mime: &str) -> Result<Part> {
    Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str(mime)
        .map_err(|e| AlbertError::conversion(name, format!("invalid mime type {}: {}", mime, e)))
}

/// Snapshot of the names already present in a collection.
#[derive(Debug, Default, Clone)]
pub struct UploadTracker {
    already_uploaded: HashSet<String>,
}

impl UploadTracker {
    /// Query the collection listing once. Transport errors propagate: if the
    /// snapshot cannot be taken, no upload should be attempted.
    pub async fn fetch(client: &AlbertClient, collection_id: &str) -> Result<Self> {
        let names = list_documents(client, collection_id).await?;
        info!(
            collection = collection_id,
            count = names.len(),
            "already uploaded"
        );
        Ok(Self::from_names(names))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            already_uploaded: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn should_skip(&self, name: &str) -> bool {
        self.already_uploaded.contains(name)
    }

    pub fn len(&self) -> usize {
        self.already_uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.already_uploaded.is_empty()
    }
}
