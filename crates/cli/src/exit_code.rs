//! Exit code definitions for the fh CLI
//!
//! Scripts depend on these values. Changing one is a breaking change.

use fh_core::Error;

/// Exit codes for the fh CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error, or a batch with failed items
    GeneralError = 1,

    /// User input error: invalid arguments, unreadable file, bad profile
    UsageError = 2,

    /// No response from the service: connection refused, timeout, DNS
    NetworkError = 3,

    /// API key rejected or origin not allowed
    AuthError = 4,

    /// Bucket, file or profile does not exist
    NotFound = 5,

    /// Conflict with the current state of the resource
    Conflict = 6,

    /// The configured API version does not support this operation
    UnsupportedFeature = 7,

    /// Operation was interrupted (e.g., Ctrl+C)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            7 => Some(Self::UnsupportedFeature),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    /// Exit code for a library error
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or input",
            Self::NetworkError => "Network error",
            Self::AuthError => "Authentication or origin rejected",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflict with current resource state",
            Self::UnsupportedFeature => "Not supported by this API version",
            Self::Interrupted => "Operation interrupted",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
