//! Error types for fh-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.
//! Failures of client operations are tagged with the [`Operation`] that produced
//! them and display as `[<operation>] <details>`.

use std::fmt;

use thiserror::Error;

/// Result type alias for fh-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client operation that can fail with a tagged error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    List,
    Remove,
    DeleteBucket,
}

impl Operation {
    /// Name used in error messages
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Upload => "upload",
            Operation::List => "list",
            Operation::Remove => "remove",
            Operation::DeleteBucket => "delete_bucket",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for fh-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Profile already exists
    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced a response (connection, DNS, timeout)
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// Feature not supported by the configured API version
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// A failure tagged with the client operation that produced it
    #[error("[{operation}] {source}")]
    Operation {
        operation: Operation,
        source: Box<Error>,
    },

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Tag an error with the operation it came from
    pub fn during(operation: Operation, source: Error) -> Self {
        Error::Operation {
            operation,
            source: Box::new(source),
        }
    }

    /// The operation this error is tagged with, if any
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Error::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// The untagged cause of this error
    pub fn root(&self) -> &Error {
        match self {
            Error::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status of a remote rejection, if that is what this error is
    pub fn remote_status(&self) -> Option<u16> {
        match self.root() {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            Error::Config(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Transport(_) => 3,                     // NetworkError
            Error::Remote { status, .. } => match status {
                401 | 403 => 4, // AuthError
                404 => 5,       // NotFound
                409 | 412 => 6, // Conflict
                _ => 1,
            },
            Error::ProfileNotFound(_) => 5,
            Error::ProfileExists(_) => 6,
            Error::UnsupportedFeature(_) => 7,
            _ => 1, // GeneralError
        }
    }
}
