//! reqwest-backed transport
//!
//! Sends [`ApiRequest`]s and decodes JSON responses. Non-success statuses
//! become [`Error::Remote`] carrying the body's `message` field when there
//! is one.

use std::time::Duration;

use async_trait::async_trait;
use fh_core::{ApiRequest, Error, HttpMethod, RequestBody, Result, TimeoutConfig, Transport};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// HTTP transport for the file-hosting API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    /// Create a transport with default timeouts
    pub fn new() -> Result<Self> {
        Self::with_timeouts(&TimeoutConfig::default())
    }

    /// Create a transport with the given connect and request timeouts
    pub fn with_timeouts(timeout: &TimeoutConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("fh/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_millis(timeout.connect_ms))
            .timeout(Duration::from_millis(timeout.request_ms))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let mut request_builder = self
            .http_client
            .request(to_method(request.method), request.url.clone());

        for (name, value) in &request.headers {
            request_builder = request_builder.header(name.as_str(), value.as_str());
        }

        request_builder = match request.body {
            RequestBody::Empty => request_builder,
            RequestBody::Multipart { field, file } => {
                let part = Part::bytes(file.data)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| {
                        Error::General(format!("Invalid content type '{}': {e}", file.content_type))
                    })?;
                request_builder.multipart(Form::new().part(field, part))
            }
        };

        let response = request_builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        tracing::debug!(%status, url = %request.url, "Received response");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(remote_error(status, &error_body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response: {e}")))?;

        Ok(decode_body(&text))
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Decode a success body; empty is `null`, non-JSON is kept as a string
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    serde_json::from_str(text).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Response body is not JSON, keeping it as text");
        Value::String(text.to_string())
    })
}

/// Build the error for a non-success response
fn remote_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|name| json.get(*name).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    Error::Remote {
        status: status.as_u16(),
        message,
    }
}
