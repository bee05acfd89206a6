//! Transport trait definition
//!
//! This trait is the seam between the client and the HTTP stack. The
//! client builds fully-resolved [`ApiRequest`]s; a transport sends them and
//! decodes the JSON response. It allows the client to be decoupled from
//! the specific HTTP library and mocked for testing.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::types::UploadFile;

/// HTTP verbs used by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// Multipart form with a single file part
    Multipart { field: String, file: UploadFile },
}

/// A fully-resolved request to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Extra headers, in the order they were added
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn multipart(mut self, field: impl Into<String>, file: UploadFile) -> Self {
        self.body = RequestBody::Multipart {
            field: field.into(),
            file,
        };
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Last path segment of the URL, percent-decoding left to the caller
    pub fn last_segment(&self) -> Option<&str> {
        self.url.path_segments().and_then(|mut s| s.next_back())
    }
}

/// Sends requests to the service
///
/// Implementations return the decoded JSON body on success (`Value::Null`
/// for an empty body), [`Error::Remote`](crate::Error::Remote) for a
/// non-success status and [`Error::Transport`](crate::Error::Transport)
/// when no response was received.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        (**self).execute(request).await
    }
}
