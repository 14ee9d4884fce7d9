//! Error types for pathmend operations.
//!
//! This module defines [`PathmendError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - `AccessDenied` is fatal for the operation that hit it and is never
//!   retried automatically
//! - `RegistryUnavailable` is transient; callers may retry once
//! - Verification and repair convert their sub-failures into structured
//!   result fields instead of raising; "tool not yet verifiable" is an
//!   expected outcome, not an exceptional one
//! - Use `anyhow::Error` (via `PathmendError::Other`) for unexpected errors

use crate::registry::PathScope;
use thiserror::Error;

/// Core error type for pathmend operations.
#[derive(Debug, Error)]
pub enum PathmendError {
    /// Caller lacks privilege for the target scope (Machine writes need
    /// an elevated process).
    #[error("Access denied for {scope} scope: {message}")]
    AccessDenied { scope: PathScope, message: String },

    /// Registry I/O failed for a reason other than privilege.
    #[error("Registry unavailable for {scope} scope: {message}")]
    RegistryUnavailable { scope: PathScope, message: String },

    /// Environment-change broadcast failed entirely. Always non-fatal;
    /// surfaced only in logs, never propagated to operation callers.
    #[error("Environment change broadcast failed: {message}")]
    BroadcastFailed { message: String },

    /// Execution test exceeded its timeout.
    #[error("Execution of '{command}' timed out after {timeout_secs}s")]
    ExecutionTimeout { command: String, timeout_secs: u64 },

    /// Execution test ran but failed (non-zero exit, empty or
    /// non-matching output).
    #[error("Execution of '{command}' failed: {message}")]
    ExecutionFailed { command: String, message: String },

    /// Tool not installed at any known location.
    #[error("No installation of '{tool}' found at known locations")]
    DiscoveryNotFound { tool: String },

    /// Failed to parse the settings file.
    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParseError {
        path: std::path::PathBuf,
        message: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PathmendError {
    /// Whether a single automatic retry is reasonable for this error.
    ///
    /// Only transient registry failures qualify; privilege errors never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PathmendError::RegistryUnavailable { .. })
    }
}

/// Result type alias for pathmend operations.
pub type Result<T> = std::result::Result<T, PathmendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_displays_scope_and_message() {
        let err = PathmendError::AccessDenied {
            scope: PathScope::Machine,
            message: "administrator privileges required".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Machine"));
        assert!(msg.contains("administrator privileges required"));
    }

    #[test]
    fn registry_unavailable_displays_scope() {
        let err = PathmendError::RegistryUnavailable {
            scope: PathScope::User,
            message: "key open failed".into(),
        };
        assert!(err.to_string().contains("User"));
    }

    #[test]
    fn execution_timeout_displays_command_and_duration() {
        let err = PathmendError::ExecutionTimeout {
            command: "claude --version".into(),
            timeout_secs: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("claude --version"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn discovery_not_found_displays_tool() {
        let err = PathmendError::DiscoveryNotFound {
            tool: "gemini".into(),
        };
        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn only_registry_unavailable_is_retryable() {
        let transient = PathmendError::RegistryUnavailable {
            scope: PathScope::User,
            message: "busy".into(),
        };
        let denied = PathmendError::AccessDenied {
            scope: PathScope::Machine,
            message: "no".into(),
        };
        assert!(transient.is_retryable());
        assert!(!denied.is_retryable());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PathmendError = io_err.into();
        assert!(matches!(err, PathmendError::Io(_)));
    }
}
