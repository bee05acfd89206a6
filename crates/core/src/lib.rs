//! fh-core: Core library for the filehost client
//!
//! This crate provides the core functionality of the filehost SDK, including:
//! - Storage key extraction from bare keys or object URLs
//! - API version dialects (legacy v1, current v2)
//! - The Transport trait the client sends requests through
//! - FileHostClient with single-item, replace and batch operations
//! - Configuration and profile management
//!
//! This crate is designed to be independent of any specific HTTP library,
//! allowing for easy testing and alternative transports.

pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod profile;
pub mod traits;
pub mod types;
pub mod version;

pub use client::{API_KEY_HEADER, ClientConfig, FileHostClient, ORIGIN_HEADER};
pub use config::{Config, ConfigManager, Defaults};
pub use error::{Error, Operation, Result};
pub use key::extract_key;
pub use profile::{Profile, ProfileManager, TimeoutConfig};
pub use traits::{ApiRequest, HttpMethod, RequestBody, Transport};
pub use types::{
    Cleanup, DeleteEntry, FileUrls, ListResult, ReplaceOutcome, StoredFile, UploadEntry,
    UploadFile, UploadResult,
};
pub use version::{ApiVersion, Dialect, ResponseShape};
