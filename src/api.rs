//! HTTP request helper.
//!
//! Two operations, GET and POST, both returning the parsed JSON body. A
//! non-success status fails with [`RequestError::Status`] carrying the
//! response body text verbatim.
//!
//! The [`Backend`] trait is the seam between the controller and the network:
//! [`HttpBackend`] talks to a live server with `reqwest`, while tests plug in
//! in-memory fakes.
//!
//! Paths passed to a backend already contain their query string. Building
//! that string, including percent-encoding user input, is the caller's job;
//! [`path_with_query`] does it.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::RequestError;

/// Multipart field name the backend's `/upload` expects.
pub const UPLOAD_FIELD: &str = "file";

/// A file to send as a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Optional POST payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Raw(Vec<u8>),
    /// A single-file multipart form under [`UPLOAD_FIELD`].
    Multipart(UploadFile),
}

/// Transport used by the controller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET path`, returning the parsed JSON body.
    async fn get_json(&self, path: &str) -> Result<Value, RequestError>;

    /// `POST path` with an optional body, returning the parsed JSON body.
    async fn post_json(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Value, RequestError>;
}

/// Decode a JSON value into a typed response.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(value).map_err(RequestError::from)
}

/// Append percent-encoded query parameters to `path`.
///
/// ```
/// use pdf_search_client::api::path_with_query;
/// assert_eq!(
///     path_with_query("/search", &[("q", "a&b c"), ("k", "10")]),
///     "/search?q=a%26b%20c&k=10"
/// );
/// ```
pub fn path_with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Build a backend rooted at `base`. Requests never time out unless
    /// `timeout` is given.
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, RequestError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base,
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let base = config.base_url()?;
        let timeout = config.server.timeout_secs.map(Duration::from_secs);
        Ok(Self::new(base, timeout)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` under the base URL, keeping any base path prefix.
    fn url(&self, path: &str) -> Result<Url, RequestError> {
        let base = self.base.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| RequestError::Transport(format!("invalid request URL: {}", e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, RequestError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "request failed");
            return Err(RequestError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_json(&self, path: &str) -> Result<Value, RequestError> {
        let url = self.url(path)?;
        debug!(method = "GET", %url, "request");
        self.send(self.client.get(url)).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Value, RequestError> {
        let url = self.url(path)?;
        debug!(method = "POST", %url, "request");

        let request = self.client.post(url);
        let request = match body {
            None => request,
            Some(RequestBody::Raw(bytes)) => request.body(bytes),
            Some(RequestBody::Multipart(file)) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str("application/pdf")?;
                request.multipart(Form::new().part(UPLOAD_FIELD, part))
            }
        };
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(Url::parse(base).unwrap(), None).unwrap()
    }

    #[test]
    fn joins_paths_onto_root() {
        let b = backend("http://127.0.0.1:8000");
        assert_eq!(b.url("/stats").unwrap().as_str(), "http://127.0.0.1:8000/stats");
    }

    #[test]
    fn keeps_base_prefix() {
        let b = backend("http://host/api/");
        assert_eq!(
            b.url("/search?q=x&k=3").unwrap().as_str(),
            "http://host/api/search?q=x&k=3"
        );
    }

    #[test]
    fn query_values_are_encoded() {
        assert_eq!(
            path_with_query("/search", &[("q", "what's <new>?"), ("k", "5")]),
            "/search?q=what%27s%20%3Cnew%3E%3F&k=5"
        );
        assert_eq!(
            path_with_query("/load_demo", &[("max_pages", "1 0")]),
            "/load_demo?max_pages=1%200"
        );
    }

    #[test]
    fn no_params_no_question_mark() {
        assert_eq!(path_with_query("/reset", &[]), "/reset");
    }
}
