//! API version dialects
//!
//! The service exposes a legacy (v1) and a current (v2) API. Both are
//! served by the same client; a [`Dialect`] captures everything that
//! differs between them: routes, the upload verb, and the shape of upload
//! responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::traits::HttpMethod;

/// API version spoken by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Legacy API: single access URL per file, no bucket deletion
    V1,
    /// Current API: URL variants, visibility metadata, bucket deletion
    #[default]
    V2,
}

impl ApiVersion {
    /// The dialect describing this version
    pub const fn dialect(self) -> &'static Dialect {
        match self {
            ApiVersion::V1 => &V1_DIALECT,
            ApiVersion::V2 => &V2_DIALECT,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" | "legacy" => Ok(ApiVersion::V1),
            "v2" | "2" | "current" => Ok(ApiVersion::V2),
            other => Err(Error::Config(format!(
                "Unknown API version '{other}'. Expected v1 or v2"
            ))),
        }
    }
}

/// How upload responses describe the stored file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ "url": ... }`
    SingleUrl,
    /// `{ "urls": { "original", "large"?, "small"?, "thumb"? }, ...metadata }`
    UrlVariants,
}

/// Route templates and request shape of one API version
///
/// Templates are `/`-separated segments relative to the base endpoint.
/// `{bucket}` and `{key}` are substituted and percent-encoded as single
/// segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub upload_method: HttpMethod,
    /// Multipart field carrying the file
    pub upload_field: &'static str,
    pub upload_route: &'static str,
    pub list_route: &'static str,
    pub remove_route: &'static str,
    /// `None` when the version cannot delete buckets
    pub delete_bucket_route: Option<&'static str>,
    pub response_shape: ResponseShape,
}

pub const V1_DIALECT: Dialect = Dialect {
    upload_method: HttpMethod::Post,
    upload_field: "file",
    upload_route: "upload/{bucket}",
    list_route: "files/{bucket}",
    remove_route: "files/{bucket}/{key}",
    delete_bucket_route: None,
    response_shape: ResponseShape::SingleUrl,
};

pub const V2_DIALECT: Dialect = Dialect {
    upload_method: HttpMethod::Put,
    upload_field: "file",
    upload_route: "buckets/{bucket}/files",
    list_route: "buckets/{bucket}/files",
    remove_route: "buckets/{bucket}/files/{key}",
    delete_bucket_route: Some("buckets/{bucket}"),
    response_shape: ResponseShape::UrlVariants,
};

/// Resolve a route template against the base endpoint
///
/// A bucket or key of `.` or `..` is rejected: URL normalization would drop
/// it and the request would address a different resource.
pub fn resolve_route(base: &Url, template: &str, bucket: &str, key: &str) -> Result<Url> {
    for (name, value) in [("bucket", bucket), ("key", key)] {
        if matches!(value, "." | "..") {
            return Err(Error::Config(format!(
                "Invalid {name} '{value}': dot segments cannot be addressed"
            )));
        }
    }

    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            Error::Config(format!("Endpoint cannot carry a path: {base}"))
        })?;
        segments.pop_if_empty();
        for part in template.split('/') {
            match part {
                "{bucket}" => segments.push(bucket),
                "{key}" => segments.push(key),
                literal => segments.push(literal),
            };
        }
    }
    Ok(url)
}
