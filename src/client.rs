//! Authenticated HTTP client for the AlbertAPI.
//!
//! One [`AlbertClient`] is built per process from [`ApiConfig`] and passed by
//! reference to every component that talks to the remote API. The bearer
//! token is installed once as a default header.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{AlbertError, Result};

#[derive(Debug, Clone)]
pub struct AlbertClient {
    http: reqwest::Client,
    base_url: String,
}

impl AlbertClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api.key))
            .map_err(|e| AlbertError::Configuration(format!("invalid API key: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = api.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| AlbertError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: api.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| AlbertError::Network {
                url: url.clone(),
                source,
            })?;
        let body = read_success_body(resp, "GET", &url).await?;
        decode(path, &body)
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%url, "POST");
        let resp = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| AlbertError::Network {
                url: url.clone(),
                source,
            })?;
        let body = read_success_body(resp, "POST", &url).await?;
        decode(path, &body)
    }

    /// POST a multipart form; the response body is not inspected.
    pub(crate) async fn post_multipart(&self, path: &str, form: Form) -> Result<()> {
        let url = self.endpoint(path);
        debug!(%url, "POST multipart");
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| AlbertError::Network {
                url: url.clone(),
                source,
            })?;
        read_success_body(resp, "POST", &url).await?;
        Ok(())
    }
}

async fn read_success_body(
    resp: reqwest::Response,
    method: &'static str,
    url: &str,
) -> Result<Vec<u8>> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AlbertError::Status {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    resp.bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|source| AlbertError::Network {
            url: url.to_string(),
            source,
        })
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AlbertError::Parse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
