//! Retrieval-augmented prompt composition.

use crate::models::{Message, Role};

/// Instruction placed before the user's question.
pub const RAG_INSTRUCTION: &str =
    "Réponds à la question suivante en te basant sur les documents ci-dessous : ";

/// Separator between retrieved chunks (two blank lines).
pub const CHUNK_SEPARATOR: &str = "\n\n\n";

/// Persona used to seed new conversations.
pub const ALBERT_PERSONA: &str =
    "Tu es Albert, un chatbot intelligent et tu réponds toujours avec une plaisanterie.";

/// Build the augmented prompt: instruction, question, then the chunks in
/// the order given.
pub fn compose<S: AsRef<str>>(question: &str, chunks: &[S]) -> String {
    let documents = chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(CHUNK_SEPARATOR);
    format!(
        "{}{}\n\nDocuments :\n\n{}",
        RAG_INSTRUCTION, question, documents
    )
}

/// Copy of `messages` whose last element carries `prompt` as its content.
/// Role and every earlier message are unchanged; returns `None` when the
/// conversation is empty.
pub fn replace_last_content(messages: &[Message], prompt: String) -> Option<Vec<Message>> {
    let (last, head) = messages.split_last()?;
    let mut out = head.to_vec();
    out.push(Message {
        role: last.role,
        content: prompt,
    });
    Some(out)
}

/// Seed conversation for a one-shot question.
pub fn seed_conversation(question: &str) -> Vec<Message> {
    vec![
        Message {
            role: Role::System,
            content: ALBERT_PERSONA.to_string(),
        },
        Message::user(question),
    ]
}
