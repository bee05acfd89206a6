//! File-hosting client
//!
//! One client serves both API versions; the configured [`ApiVersion`]
//! selects the dialect. Single-item operations make exactly one request
//! and fail fast. `replace` and the batch operations are built on top of
//! them and isolate failures instead of propagating them.

use std::fmt;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Operation, Result};
use crate::key::extract_key;
use crate::traits::{ApiRequest, HttpMethod, Transport};
use crate::types::{
    Cleanup, DeleteEntry, ListResult, ReplaceOutcome, UploadEntry, UploadFile, UploadResult,
};
use crate::version::{ApiVersion, Dialect, resolve_route};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header forwarded for server-side origin allow-listing
pub const ORIGIN_HEADER: &str = "Origin";

/// Immutable client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub origin: Option<String>,
    pub base_endpoint: Url,
    pub version: ApiVersion,
    /// Items in flight at once during batch operations
    pub max_concurrency: usize,
}

impl ClientConfig {
    /// Create a configuration; the endpoint must be an absolute URL
    pub fn new(
        api_key: impl Into<String>,
        base_endpoint: &str,
        version: ApiVersion,
    ) -> Result<Self> {
        let base_endpoint = Url::parse(base_endpoint)?;
        if base_endpoint.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Endpoint cannot carry a path: {base_endpoint}"
            )));
        }

        Ok(Self {
            api_key: api_key.into(),
            origin: None,
            base_endpoint,
            version,
            max_concurrency: 1,
        })
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Zero is treated as one
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("origin", &self.origin)
            .field("base_endpoint", &self.base_endpoint.as_str())
            .field("version", &self.version)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

/// Client for the file-hosting service
pub struct FileHostClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> FileHostClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn dialect(&self) -> &'static Dialect {
        self.config.version.dialect()
    }

    /// Upload a file to a bucket
    pub async fn upload(&self, bucket: &str, file: UploadFile) -> Result<UploadResult> {
        let dialect = self.dialect();
        let request = self.request(
            Operation::Upload,
            dialect.upload_method,
            dialect.upload_route,
            bucket,
            "",
        )?;

        let request = request.multipart(dialect.upload_field, file);
        let response = self.dispatch(Operation::Upload, request).await?;

        Ok(UploadResult::from_response(dialect.response_shape, response))
    }

    /// List the files of a bucket
    pub async fn list(&self, bucket: &str) -> Result<ListResult> {
        let dialect = self.dialect();
        let response = self
            .send(Operation::List, HttpMethod::Get, dialect.list_route, bucket, "")
            .await?;

        Ok(ListResult::from_response(dialect.response_shape, response))
    }

    /// Delete a file, given its bare key or its URL
    pub async fn remove(&self, bucket: &str, key_or_url: &str) -> Result<Value> {
        let key = extract_key(key_or_url);
        self.send(
            Operation::Remove,
            HttpMethod::Delete,
            self.dialect().remove_route,
            bucket,
            key,
        )
        .await
    }

    /// Delete a whole bucket (API v2 only)
    pub async fn delete_bucket(&self, bucket: &str) -> Result<Value> {
        let Some(route) = self.dialect().delete_bucket_route else {
            return Err(Error::during(
                Operation::DeleteBucket,
                Error::UnsupportedFeature(format!(
                    "bucket deletion is not available in API {}",
                    self.config.version
                )),
            ));
        };

        self.send(Operation::DeleteBucket, HttpMethod::Delete, route, bucket, "")
            .await
    }

    /// Upload `file`, removing `previous` first when given
    ///
    /// Removal of the previous file is best-effort: a failure is logged and
    /// the upload still happens. Only the upload's outcome is returned; use
    /// [`replace_detailed`](Self::replace_detailed) to see the removal too.
    pub async fn replace(
        &self,
        bucket: &str,
        file: UploadFile,
        previous: Option<&str>,
    ) -> Result<UploadResult> {
        self.replace_detailed(bucket, file, previous)
            .await
            .map(|outcome| outcome.upload)
    }

    /// Like [`replace`](Self::replace), also reporting what happened to the
    /// previous file
    pub async fn replace_detailed(
        &self,
        bucket: &str,
        file: UploadFile,
        previous: Option<&str>,
    ) -> Result<ReplaceOutcome> {
        let cleanup = match previous {
            Some(key_or_url) => Some(self.cleanup_previous(bucket, key_or_url).await),
            None => None,
        };

        let upload = self.upload(bucket, file).await?;
        Ok(ReplaceOutcome { upload, cleanup })
    }

    /// Attempt to remove a file, keeping the outcome only for diagnostics
    pub async fn cleanup_previous(&self, bucket: &str, key_or_url: &str) -> Cleanup {
        let key = extract_key(key_or_url).to_string();
        match self.remove(bucket, &key).await {
            Ok(_) => Cleanup { key, error: None },
            Err(e) => {
                tracing::warn!(
                    bucket,
                    key = %key,
                    error = %e,
                    "Could not remove previous file, uploading anyway"
                );
                Cleanup {
                    key,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Delete several files; one entry per input, in input order
    pub async fn delete_multiple<S: AsRef<str>>(
        &self,
        bucket: &str,
        keys_or_urls: &[S],
    ) -> Vec<DeleteEntry> {
        stream::iter(keys_or_urls.iter().map(|k| extract_key(k.as_ref()).to_string()))
            .map(|key| async move {
                match self.remove(bucket, &key).await {
                    Ok(_) => DeleteEntry {
                        key,
                        success: true,
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(
                            bucket,
                            key = %key,
                            error = %e,
                            "Batch delete item failed"
                        );
                        DeleteEntry {
                            key,
                            success: false,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Upload several files; one entry per input, in input order
    pub async fn upload_multiple(&self, bucket: &str, files: Vec<UploadFile>) -> Vec<UploadEntry> {
        stream::iter(files)
            .map(|file| async move {
                let name = file.file_name.clone();
                match self.upload(bucket, file).await {
                    Ok(result) => UploadEntry {
                        file: name,
                        success: true,
                        data: Some(result),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(
                            bucket,
                            file = %name,
                            error = %e,
                            "Batch upload item failed"
                        );
                        UploadEntry {
                            file: name,
                            success: false,
                            data: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Build, authorize and send one bodiless request, tagging any failure
    async fn send(
        &self,
        operation: Operation,
        method: HttpMethod,
        route: &str,
        bucket: &str,
        key: &str,
    ) -> Result<Value> {
        let request = self.request(operation, method, route, bucket, key)?;
        self.dispatch(operation, request).await
    }

    /// Resolve the route and attach the credentials
    fn request(
        &self,
        operation: Operation,
        method: HttpMethod,
        route: &str,
        bucket: &str,
        key: &str,
    ) -> Result<ApiRequest> {
        let url = resolve_route(&self.config.base_endpoint, route, bucket, key)
            .map_err(|e| Error::during(operation, e))?;
        Ok(self.authorize(ApiRequest::new(method, url)))
    }

    async fn dispatch(&self, operation: Operation, request: ApiRequest) -> Result<Value> {
        tracing::debug!(
            %operation,
            method = %request.method,
            url = %request.url,
            "Sending request"
        );

        self.transport
            .execute(request)
            .await
            .map_err(|e| Error::during(operation, e))
    }

    fn authorize(&self, request: ApiRequest) -> ApiRequest {
        let request = request.header(API_KEY_HEADER, self.config.api_key.as_str());
        match &self.config.origin {
            Some(origin) => request.header(ORIGIN_HEADER, origin.as_str()),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockTransport, RequestBody};
    use async_trait::async_trait;
    use mockall::Sequence;
    use serde_json::json;
    use std::time::Duration;

    const ENDPOINT: &str = "https://api.example.com";

    fn config(version: ApiVersion) -> ClientConfig {
        ClientConfig::new("secret", ENDPOINT, version).unwrap()
    }

    fn client(version: ApiVersion, transport: MockTransport) -> FileHostClient<MockTransport> {
        FileHostClient::new(config(version), transport)
    }

    fn file(name: &str) -> UploadFile {
        UploadFile::new(name, "image/jpeg", b"jpeg bytes".to_vec())
    }

    fn is_delete(req: &ApiRequest) -> bool {
        req.method == HttpMethod::Delete
    }

    fn not_found() -> Error {
        Error::Remote {
            status: 404,
            message: "File not found".into(),
        }
    }

    #[test]
    fn test_config_rejects_bad_endpoint() {
        assert!(ClientConfig::new("k", "not a url", ApiVersion::V2).is_err());
        assert!(ClientConfig::new("k", "mailto:a@b.c", ApiVersion::V2).is_err());
    }

    #[test]
    fn test_config_clamps_concurrency() {
        let config = config(ApiVersion::V2).with_max_concurrency(0);
        assert_eq!(config.max_concurrency, 1);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let debug = format!("{:?}", config(ApiVersion::V2));
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_upload_v2_request_and_result() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Put
                    && req.url.as_str() == "https://api.example.com/buckets/pics/files"
                    && req.header_value("x-api-key") == Some("secret")
                    && req.header_value("origin") == Some("https://app.example.com")
                    && matches!(
                        &req.body,
                        RequestBody::Multipart { field, file }
                            if field == "file" && file.file_name == "cat.jpg"
                    )
            })
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "key": "cat.jpg",
                    "urls": {
                        "original": "https://cdn/u/pics/cat.jpg",
                        "thumb": "https://cdn/u/pics/thumb/cat.jpg"
                    },
                    "isPublic": false
                }))
            });

        let client = FileHostClient::new(
            config(ApiVersion::V2).with_origin("https://app.example.com"),
            transport,
        );
        let result = client.upload("pics", file("cat.jpg")).await.unwrap();

        assert_eq!(result.url(), Some("https://cdn/u/pics/cat.jpg"));
        assert_eq!(
            result.file.urls.thumb.as_deref(),
            Some("https://cdn/u/pics/thumb/cat.jpg")
        );
        assert_eq!(result.file.is_public, Some(false));
    }

    #[tokio::test]
    async fn test_upload_v1_uses_post_and_single_url() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url.as_str() == "https://api.example.com/upload/pics"
                    && req.header_value("origin").is_none()
            })
            .times(1)
            .returning(|_| Ok(json!({"url": "https://cdn/u/pics/cat.jpg"})));

        let client = client(ApiVersion::V1, transport);
        let result = client.upload("pics", file("cat.jpg")).await.unwrap();

        assert_eq!(result.url(), Some("https://cdn/u/pics/cat.jpg"));
        assert_eq!(result.file.key.as_deref(), Some("cat.jpg"));
    }

    #[tokio::test]
    async fn test_list_returns_files() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url.as_str() == "https://api.example.com/buckets/pics/files"
            })
            .times(1)
            .returning(|_| Ok(json!({"files": [{"key": "a.jpg"}, {"key": "b.jpg"}]})));

        let client = client(ApiVersion::V2, transport);
        let result = client.list("pics").await.unwrap();

        let keys: Vec<_> = result.files.iter().filter_map(|f| f.key.as_deref()).collect();
        assert_eq!(keys, vec!["a.jpg", "b.jpg"]);
    }

    #[tokio::test]
    async fn test_remove_normalizes_url() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                is_delete(req)
                    && req.url.as_str() == "https://api.example.com/buckets/pics/files/photo.jpg"
            })
            .times(1)
            .returning(|_| Ok(json!({"deleted": true})));

        let client = client(ApiVersion::V2, transport);
        let body = client
            .remove("pics", "https://host/u/pics/photo.jpg")
            .await
            .unwrap();
        assert_eq!(body, json!({"deleted": true}));
    }

    #[tokio::test]
    async fn test_dot_segment_key_sends_nothing() {
        // No expectations: a request to the collection URL would panic
        let client = client(ApiVersion::V2, MockTransport::new());

        let err = client.remove("pics", "https://cdn/u/pics/..").await.unwrap_err();
        assert_eq!(err.operation(), Some(Operation::Remove));
        assert!(matches!(err.root(), Error::Config(_)));
        assert_eq!(err.exit_code(), 2);

        let err = client.delete_bucket("..").await.unwrap_err();
        assert_eq!(err.operation(), Some(Operation::DeleteBucket));

        let results = client.delete_multiple("pics", &["a/.", "b/.."]).await;
        assert!(results.iter().all(|r| !r.success));
        assert_eq!(results[0].key, ".");
    }

    #[tokio::test]
    async fn test_transport_failure_is_tagged() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Err(Error::Transport("connection refused".into())));

        let client = client(ApiVersion::V2, transport);

        let err = client.list("pics").await.unwrap_err();
        assert!(err.to_string().starts_with("[list] "));
        assert_eq!(err.to_string(), "[list] connection refused");

        let err = client.upload("pics", file("a.jpg")).await.unwrap_err();
        assert!(err.to_string().starts_with("[upload] "));

        let err = client.remove("pics", "a.jpg").await.unwrap_err();
        assert!(err.to_string().starts_with("[remove] "));

        let err = client.delete_bucket("pics").await.unwrap_err();
        assert!(err.to_string().starts_with("[delete_bucket] "));
        assert_eq!(err.operation(), Some(Operation::DeleteBucket));
    }

    #[tokio::test]
    async fn test_remote_message_is_used() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_| Err(not_found()));

        let client = client(ApiVersion::V2, transport);
        let err = client.remove("pics", "gone.jpg").await.unwrap_err();

        assert_eq!(err.to_string(), "[remove] File not found");
        assert_eq!(err.remote_status(), Some(404));
    }

    #[tokio::test]
    async fn test_delete_bucket_v2() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                is_delete(req) && req.url.as_str() == "https://api.example.com/buckets/old"
            })
            .times(1)
            .returning(|_| Ok(Value::Null));

        let client = client(ApiVersion::V2, transport);
        assert_eq!(client.delete_bucket("old").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_delete_bucket_v1_is_unsupported_without_request() {
        // No expectations: any request would panic
        let client = client(ApiVersion::V1, MockTransport::new());
        let err = client.delete_bucket("old").await.unwrap_err();

        assert!(err.to_string().starts_with("[delete_bucket] Unsupported feature"));
        assert_eq!(err.exit_code(), 7);
    }

    #[tokio::test]
    async fn test_replace_uploads_even_if_delete_fails() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| is_delete(req) && req.last_segment() == Some("old.jpg"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(not_found()));
        transport
            .expect_execute()
            .withf(|req| req.method == HttpMethod::Put)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({"urls": {"original": "https://cdn/u/pics/new.jpg"}})));

        let client = client(ApiVersion::V2, transport);
        let result = client
            .replace("pics", file("new.jpg"), Some("https://cdn/u/pics/old.jpg"))
            .await
            .unwrap();

        assert_eq!(result.url(), Some("https://cdn/u/pics/new.jpg"));
    }

    #[tokio::test]
    async fn test_replace_detailed_reports_cleanup() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(is_delete)
            .times(1)
            .returning(|_| Err(not_found()));
        transport
            .expect_execute()
            .withf(|req| req.method == HttpMethod::Put)
            .times(1)
            .returning(|_| Ok(json!({"urls": {"original": "https://cdn/u/pics/new.jpg"}})));

        let client = client(ApiVersion::V2, transport);
        let outcome = client
            .replace_detailed("pics", file("new.jpg"), Some("old.jpg"))
            .await
            .unwrap();

        let cleanup = outcome.cleanup.unwrap();
        assert_eq!(cleanup.key, "old.jpg");
        assert!(!cleanup.succeeded());
        assert_eq!(cleanup.error.as_deref(), Some("[remove] File not found"));
    }

    #[tokio::test]
    async fn test_replace_without_previous_never_deletes() {
        let mut transport = MockTransport::new();
        transport.expect_execute().withf(is_delete).times(0);
        transport
            .expect_execute()
            .withf(|req| req.method == HttpMethod::Put)
            .times(1)
            .returning(|_| Ok(json!({"urls": {"original": "https://cdn/u/pics/new.jpg"}})));

        let client = client(ApiVersion::V2, transport);
        let outcome = client
            .replace_detailed("pics", file("new.jpg"), None)
            .await
            .unwrap();

        assert!(outcome.cleanup.is_none());
    }

    #[tokio::test]
    async fn test_replace_propagates_upload_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(is_delete)
            .returning(|_| Ok(Value::Null));
        transport
            .expect_execute()
            .withf(|req| req.method == HttpMethod::Put)
            .returning(|_| {
                Err(Error::Remote {
                    status: 413,
                    message: "File too large".into(),
                })
            });

        let client = client(ApiVersion::V2, transport);
        let err = client
            .replace("pics", file("big.jpg"), Some("old.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "[upload] File too large");
    }

    #[tokio::test]
    async fn test_delete_multiple_isolates_failures() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.last_segment() == Some("k2"))
            .times(1)
            .returning(|_| Err(not_found()));
        transport
            .expect_execute()
            .withf(|req| req.last_segment() != Some("k2"))
            .times(2)
            .returning(|_| Ok(Value::Null));

        let client = client(ApiVersion::V2, transport);
        let results = client
            .delete_multiple("b", &["k1", "https://cdn/u/b/k2", "k3"])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].key, "k1");
        assert!(results[0].success);
        assert_eq!(results[1].key, "k2");
        assert!(!results[1].success);
        assert_eq!(results[1].error.as_deref(), Some("[remove] File not found"));
        assert_eq!(results[2].key, "k3");
        assert!(results[2].success);
        assert!(results[2].error.is_none());
    }

    #[tokio::test]
    async fn test_delete_multiple_scenario() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|req| {
            if req.last_segment() == Some("y.jpg") {
                Err(Error::Transport("connection reset".into()))
            } else {
                Ok(Value::Null)
            }
        });

        let client = client(ApiVersion::V1, transport);
        let results = client.delete_multiple("b", &["x.jpg", "y.jpg"]).await;

        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!([
                {"key": "x.jpg", "success": true},
                {"key": "y.jpg", "success": false, "error": "[remove] connection reset"}
            ])
        );
    }

    #[tokio::test]
    async fn test_delete_multiple_empty() {
        let client = client(ApiVersion::V2, MockTransport::new());
        let keys: [&str; 0] = [];
        assert!(client.delete_multiple("b", &keys).await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_multiple_isolates_failures() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(3).returning(|req| match &req.body {
            RequestBody::Multipart { file, .. } if file.file_name == "bad.png" => {
                Err(Error::Remote {
                    status: 415,
                    message: "Unsupported file type".into(),
                })
            }
            RequestBody::Multipart { file, .. } => Ok(json!({
                "urls": {"original": format!("https://cdn/u/b/{}", file.file_name)}
            })),
            RequestBody::Empty => Err(Error::General("expected multipart".into())),
        });

        let client = client(ApiVersion::V2, transport);
        let results = client
            .upload_multiple("b", vec![file("a.png"), file("bad.png"), file("c.png")])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].file, "a.png");
        assert!(results[0].success);
        assert_eq!(
            results[0].data.as_ref().and_then(|d| d.url()),
            Some("https://cdn/u/b/a.png")
        );
        assert_eq!(results[1].file, "bad.png");
        assert!(!results[1].success);
        assert!(results[1].data.is_none());
        assert_eq!(results[1].error.as_deref(), Some("[upload] Unsupported file type"));
        assert_eq!(results[2].file, "c.png");
        assert!(results[2].success);
    }

    /// Answers later for earlier keys so concurrent completions arrive out of order
    struct SlowFirstTransport;

    #[async_trait]
    impl Transport for SlowFirstTransport {
        async fn execute(&self, request: ApiRequest) -> Result<Value> {
            let key = request.last_segment().unwrap_or_default().to_string();
            let delay = match key.as_str() {
                "k1" => 60,
                "k2" => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if key == "k2" {
                Err(Error::Transport("timed out".into()))
            } else {
                Ok(Value::Null)
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_batch_preserves_order() {
        let client = FileHostClient::new(
            config(ApiVersion::V2).with_max_concurrency(3),
            SlowFirstTransport,
        );
        let results = client.delete_multiple("b", &["k1", "k2", "k3"]).await;

        let keys: Vec<_> = results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2", "k3"]);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[2].success);
    }
}
