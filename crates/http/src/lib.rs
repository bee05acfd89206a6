//! fh-http: HTTP transport for the filehost client
//!
//! This crate provides the implementation of the Transport trait
//! using reqwest. It is the only crate that directly depends on the
//! HTTP stack.

pub mod transport;

use fh_core::{FileHostClient, Profile, Result};

pub use transport::HttpTransport;

/// Build a client for a configured profile
pub fn connect(profile: &Profile, max_concurrency: usize) -> Result<FileHostClient<HttpTransport>> {
    let config = profile.client_config(max_concurrency)?;
    let transport = HttpTransport::with_timeouts(&profile.timeout_config())?;
    Ok(FileHostClient::new(config, transport))
}
