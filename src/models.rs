//! Conversation types and the typed schemas of the remote AlbertAPI payloads.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single `{role, content}` chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ============ GET /documents/{collection} ============

#[derive(Debug, Deserialize)]
pub struct DocumentList {
    pub data: Vec<DocumentEntry>,
}

/// A document already stored in a collection. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct DocumentEntry {
    pub name: String,
}

// ============ POST /search ============

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub collections: Vec<&'a str>,
    pub k: usize,
    pub prompt: &'a str,
    pub method: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub chunk: SearchChunk,
}

/// Retrieved fragment of a document, in the rank order the endpoint returned.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchChunk {
    pub content: String,
}

// ============ POST /chat/completions ============

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}
