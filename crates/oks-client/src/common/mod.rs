//! Common utilities for the OKS API client
//!
//! Authentication headers, URL building and the response envelope shared by
//! every endpoint.

use crate::error::OksError;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

/// Key the API uses for request metadata in every response envelope
pub const RESPONSE_CONTEXT_KEY: &str = "ResponseContext";

/// Credentials attached to every request
#[derive(Clone)]
pub enum Credentials {
    /// Access key / secret key pair, sent as `AccessKey` / `SecretKey` headers
    AccessKey {
        access_key: String,
        secret_key: String,
    },
    /// Username / password, sent as HTTP basic auth
    Basic { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessKey { access_key, .. } => f
                .debug_struct("AccessKey")
                .field("access_key", access_key)
                .finish_non_exhaustive(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// HTTP client wrapper with authentication
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path relative to the API root
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Build query string from filters
    pub fn build_query_string(&self, filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::AccessKey {
                access_key,
                secret_key,
            } => request
                .header("AccessKey", access_key)
                .header("SecretKey", secret_key),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }

    /// GET a resource and return the unwrapped envelope payload
    pub async fn get(&self, path: &str, filters: &[(&str, &str)]) -> Result<Value, OksError> {
        let mut url = self.build_url(path);
        if !filters.is_empty() {
            url = format!("{}?{}", url, self.build_query_string(filters));
        }
        debug!("GET {}", url);

        let response = self
            .authenticate(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(OksError::Http)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == 401 || status == 403 {
            return Err(OksError::Authentication(format!("{} - {}", status, body)));
        }

        if status == 404 {
            return Err(OksError::NotFound(format!("{} - {}", path, body)));
        }

        if !status.is_success() {
            return Err(OksError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            OksError::InvalidResponse(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                body.chars().take(500).collect::<String>()
            ))
        })?;
        Ok(unwrap_envelope(value))
    }
}

/// Strip the `ResponseContext` envelope.
///
/// Responses look like `{"ResponseContext": {...}, "Projects": [...]}`. When
/// exactly one payload key remains its value is returned, otherwise the
/// object is returned without the context key.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.remove(RESPONSE_CONTEXT_KEY);
            if map.len() == 1 {
                map.into_iter()
                    .next()
                    .map(|(_, v)| v)
                    .unwrap_or(Value::Null)
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}
