//! Configuration loading.
//!
//! Settings come from an optional TOML file, then the environment overrides
//! the connection values. The API key is only read from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AlbertError;

pub const ENV_API_ROOT: &str = "ALBERT_API_ROOT";
pub const ENV_API_VERSION: &str = "ALBERT_API_VERSION";
pub const ENV_API_KEY: &str = "ALBERT_API_KEY";
pub const ENV_COLLECTION_ID: &str = "ALBERT_COLLECTION_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub version: String,
    /// Never read from the file.
    #[serde(skip)]
    pub key: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    /// `{root}/{version}`, the prefix of every remote endpoint.
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.root.trim_end_matches('/'),
            self.version.trim_matches('/')
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    #[serde(default = "default_chat_model")]
    pub chat: String,
    #[serde(default = "default_rag_model")]
    pub rag: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            chat: default_chat_model(),
            rag: default_rag_model(),
        }
    }
}

fn default_chat_model() -> String {
    "mistralai/Pixtral-12B-2409".to_string()
}
fn default_rag_model() -> String {
    "AgentPublic/llama3-instruct-8b".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub collection_id: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_method")]
    pub method: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collection_id: String::new(),
            k: default_k(),
            method: default_method(),
        }
    }
}

fn default_k() -> usize {
    6
}
fn default_method() -> String {
    "semantic".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_ingest_root")]
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            root: default_ingest_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
            font_size: default_font_size(),
        }
    }
}

fn default_ingest_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.py".to_string()]
}
fn default_font_size() -> f32 {
    10.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

/// Load configuration from `path` (if it exists) and the process environment.
pub fn load_config(path: &Path) -> Result<Config> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Like [`load_config`], with the environment lookup supplied by the caller.
pub fn load_config_with_env<F>(path: &Path, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());
    if let Some(root) = lookup(ENV_API_ROOT) {
        config.api.root = root;
    }
    if let Some(version) = lookup(ENV_API_VERSION) {
        config.api.version = version;
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.api.key = key;
    }
    if let Some(collection) = lookup(ENV_COLLECTION_ID) {
        config.retrieval.collection_id = collection;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let required = [
        (ENV_API_ROOT, &config.api.root),
        (ENV_API_VERSION, &config.api.version),
        (ENV_API_KEY, &config.api.key),
        (ENV_COLLECTION_ID, &config.retrieval.collection_id),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AlbertError::Configuration(format!("{} not set", missing.join(", "))).into());
    }

    let invalid = if config.retrieval.k == 0 {
        Some("retrieval.k must be >= 1")
    } else if config.retrieval.method.trim().is_empty() {
        Some("retrieval.method must not be empty")
    } else if config.ingest.font_size <= 0.0 {
        Some("ingest.font_size must be > 0")
    } else {
        None
    };
    if let Some(reason) = invalid {
        return Err(AlbertError::Configuration(reason.to_string()).into());
    }

    Ok(())
}
