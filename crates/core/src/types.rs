//! Request payloads and result types
//!
//! Response bodies are kept verbatim next to a lenient typed view. The
//! typed view never fails to build: fields the service did not send are
//! left empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::extract_key;
use crate::version::ResponseShape;

/// A file to upload: content plus the name and content type sent in the
/// multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Size of the content in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Access URLs of a stored file
///
/// The legacy API only hands out `original`. The current API adds resized
/// variants for image content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// Typed view of a file record returned by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Storage key inside the bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    pub urls: FileUrls,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Whether the file is publicly accessible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<jiff::Timestamp>,
}

impl StoredFile {
    /// Build the typed view of one file record
    pub fn from_json(shape: ResponseShape, value: &Value) -> Self {
        let value = unwrap_envelope(value);

        let urls = match shape {
            ResponseShape::SingleUrl => FileUrls {
                original: string_field(value, &["url"]),
                ..Default::default()
            },
            ResponseShape::UrlVariants => match value.get("urls") {
                Some(urls) => FileUrls {
                    original: string_field(urls, &["original"]),
                    large: string_field(urls, &["large"]),
                    small: string_field(urls, &["small"]),
                    thumb: string_field(urls, &["thumb"]),
                },
                None => FileUrls {
                    original: string_field(value, &["url"]),
                    ..Default::default()
                },
            },
        };

        let key = string_field(value, &["key", "fileKey"]).or_else(|| {
            urls.original
                .as_deref()
                .map(extract_key)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
        });

        Self {
            key,
            urls,
            size: value.get("size").and_then(Value::as_u64),
            content_type: string_field(value, &["mimeType", "contentType", "content_type"]),
            is_public: ["isPublic", "public", "is_public"]
                .iter()
                .find_map(|name| value.get(*name).and_then(Value::as_bool)),
            uploaded_at: string_field(value, &["uploadedAt", "createdAt", "uploaded_at"])
                .and_then(|s| s.parse::<jiff::Timestamp>().ok()),
        }
    }
}

/// Result of an upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    /// Typed view of the uploaded file
    pub file: StoredFile,

    /// Decoded response body, unchanged
    pub response: Value,
}

impl UploadResult {
    pub fn from_response(shape: ResponseShape, response: Value) -> Self {
        Self {
            file: StoredFile::from_json(shape, &response),
            response,
        }
    }

    /// Primary access URL of the uploaded file
    pub fn url(&self) -> Option<&str> {
        self.file.urls.original.as_deref()
    }
}

/// Result of listing a bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult {
    pub files: Vec<StoredFile>,

    /// Decoded response body, unchanged
    pub response: Value,
}

impl ListResult {
    pub fn from_response(shape: ResponseShape, response: Value) -> Self {
        let files = file_array(&response)
            .map(|items| {
                items
                    .iter()
                    .map(|item| StoredFile::from_json(shape, item))
                    .collect()
            })
            .unwrap_or_default();

        Self { files, response }
    }
}

/// Per-item result of a batch deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteEntry {
    /// Normalized key that was deleted
    pub key: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-item result of a batch upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadEntry {
    /// File name of the uploaded item
    pub file: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UploadResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened to the previous file during a replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cleanup {
    /// Normalized key of the previous file
    pub key: String,

    /// Why the deletion failed; `None` when it succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Cleanup {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Detailed result of a replace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaceOutcome {
    pub upload: UploadResult,

    /// `None` when no previous file was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<Cleanup>,
}

fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

fn file_array(value: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = value.as_array() {
        return Some(items);
    }

    ["files", "data"].iter().find_map(|name| match value.get(*name) {
        Some(Value::Array(items)) => Some(items),
        Some(inner) if inner.is_object() => inner.get("files").and_then(Value::as_array),
        _ => None,
    })
}

fn string_field(value: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}
