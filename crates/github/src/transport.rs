//! The REST transport seam.
//!
//! Tools build a [`GithubRequest`] value; a [`GithubTransport`] executes it.
//! Splitting the two keeps scope enforcement and request shaping testable
//! with a recording stub — a scope violation must provably reach the
//! transport zero times.

use async_trait::async_trait;
use octoagent_core::ToolError;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Request timeout on the GitHub path.
const TIMEOUT: Duration = Duration::from_secs(15);

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One outbound REST request, fully shaped by the tool that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct GithubRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/repos/alice/demo/issues`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl GithubRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present.
    pub fn maybe_query(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }
}

/// Executes shaped requests. Implemented by the reqwest-backed transport in
/// production and by a recording stub in tests.
#[async_trait]
pub trait GithubTransport: Send + Sync {
    async fn execute(&self, request: GithubRequest) -> Result<Value, ToolError>;
}

/// Production transport: bearer auth, the GitHub media type and API version
/// headers, a bounded per-request timeout, and a configurable base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| ToolError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl GithubTransport for HttpTransport {
    async fn execute(&self, request: GithubRequest) -> Result<Value, ToolError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = request.method.as_str(), path = %request.path, "GitHub request");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ToolError::Network(format!("request timed out after {}s", TIMEOUT.as_secs()))
            } else {
                ToolError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(ToolError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.is_empty() {
            // 204-style responses: report the status so the engine sees
            // the call landed.
            return Ok(serde_json::json!({"status_code": status.as_u16()}));
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every request and answers with a canned payload.
    pub struct RecordingTransport {
        pub requests: Mutex<Vec<GithubRequest>>,
        pub response: Value,
    }

    impl RecordingTransport {
        pub fn new(response: Value) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response,
            }
        }

        pub fn ok() -> Self {
            Self::new(serde_json::json!({"ok": true}))
        }

        pub fn recorded(&self) -> Vec<GithubRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GithubTransport for RecordingTransport {
        async fn execute(&self, request: GithubRequest) -> Result<Value, ToolError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }
}
