//! Chat and retrieval-augmented chat pipelines.
//!
//! Both are single linear passes with no retries: any step that fails ends
//! the request with that error.

use tracing::info;

use crate::client::AlbertClient;
use crate::completion::complete;
use crate::config::{ModelsConfig, RetrievalConfig};
use crate::error::{AlbertError, Result};
use crate::models::Message;
use crate::prompt::{compose, replace_last_content};
use crate::search::{search, SearchOptions};

/// Plain chat: forward the conversation to the default chat model.
pub async fn chat(
    client: &AlbertClient,
    models: &ModelsConfig,
    messages: &[Message],
) -> Result<String> {
    complete(client, messages, &models.chat).await
}

/// Retrieval-augmented chat.
///
/// 1. The last message's content is the query.
/// 2. Search `retrieval.collection_id` for the top-k chunks.
/// 3. Compose the augmented prompt.
/// 4. Replace the last message's content with it, in a new conversation.
/// 5. Complete with the RAG model.
pub async fn rag_chat(
    client: &AlbertClient,
    models: &ModelsConfig,
    retrieval: &RetrievalConfig,
    messages: &[Message],
) -> Result<String> {
    let question = messages
        .last()
        .map(|m| m.content.as_str())
        .ok_or(AlbertError::EmptyConversation)?;

    let chunks = search(
        client,
        &retrieval.collection_id,
        question,
        &SearchOptions::from(retrieval),
    )
    .await?;
    info!(
        collection = %retrieval.collection_id,
        chunks = chunks.len(),
        "retrieved context"
    );

    let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    let prompt = compose(question, &contents);
    let augmented =
        replace_last_content(messages, prompt).ok_or(AlbertError::EmptyConversation)?;

    complete(client, &augmented, &models.rag).await
}
