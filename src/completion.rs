//! OpenAI-compatible chat completion call.

use crate::client::AlbertClient;
use crate::error::{AlbertError, Result};
use crate::models::{CompletionRequest, CompletionResponse, Message};

const ENDPOINT: &str = "chat/completions";

/// Send `messages` to `model` and return the first choice's content.
pub async fn complete(client: &AlbertClient, messages: &[Message], model: &str) -> Result<String> {
    let request = CompletionRequest { model, messages };
    let response: CompletionResponse = client.post_json(ENDPOINT, &request).await?;
    first_choice(response)
}

fn first_choice(response: CompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AlbertError::Parse {
            endpoint: ENDPOINT.to_string(),
            message: "no message content in choices[0]".to_string(),
        })
}
