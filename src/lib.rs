//! # Albert RAG
//!
//! Ingest a source tree into an AlbertAPI collection and answer questions
//! over it with retrieval-augmented generation.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌──────────────┐
//! │ Source tree │──▶│ PDF render │──▶│ POST /files   │   albert ingest
//! └────────────┘   └───────────┘   └──────────────┘
//!        skip names already in GET /documents/{collection}
//!
//! ┌────────────┐   ┌──────────────┐   ┌──────────┐   ┌──────────────────┐
//! │ messages   │──▶│ POST /search  │──▶│ compose  │──▶│ chat/completions │  albert serve
//! └────────────┘   └──────────────┘   └──────────┘   └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export ALBERT_API_ROOT=https://albert.api.example ALBERT_API_VERSION=v1
//! export ALBERT_API_KEY=... ALBERT_COLLECTION_ID=...
//! albert ingest --root ~/src/albert-api
//! albert ask --rag "Comment fonctionne la recherche ?"
//! albert serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML + environment configuration |
//! | [`error`] | Error taxonomy |
//! | [`client`] | Authenticated AlbertAPI HTTP client |
//! | [`models`] | Conversation types and wire schemas |
//! | [`convert`] | Source file → PDF rendering, document naming |
//! | [`collection`] | Collection listing, upload tracker, file upload |
//! | [`ingest`] | Sequential batch uploader |
//! | [`progress`] | Ingest progress reporting |
//! | [`search`] | Collection search |
//! | [`prompt`] | RAG prompt composition |
//! | [`completion`] | Chat completion call |
//! | [`rag`] | Chat and RAG pipelines |
//! | [`server`] | Chat proxy HTTP server |
//! | [`logging`] | Tracing subscriber setup |

pub mod client;
pub mod collection;
pub mod completion;
pub mod config;
pub mod convert;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod progress;
pub mod prompt;
pub mod rag;
pub mod search;
pub mod server;
