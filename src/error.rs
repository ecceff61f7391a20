//! Error types and handling infrastructure for graytail.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the engine's error taxonomy. `anyhow` is reserved for process setup in `main`.
//!
//! ## Propagation
//!
//! - **Backend errors** (`Transport`, `Auth`, `Backend`, `Decode`) never escape the poll
//!   scheduler; they are converted into a status the render surface displays.
//! - **Validation errors** are rejected synchronously before any network call.
//! - **Setup errors** (`Config`, terminal `UIError`) are the only fatal ones.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for graytail operations.
#[derive(Error, Debug)]
pub enum GraytailError {
    /// Network failure, connection refused, or request timeout
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Backend rejected our credentials (401/403)
    #[error("Authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    /// Any other non-2xx response; the body is kept verbatim
    #[error("Backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// Response body could not be decoded into the expected envelope
    #[error("Malformed response: {message}")]
    Decode { message: String },

    /// Request rejected locally before reaching the network
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// Configuration missing or unreadable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Config file could not be found
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UIError { message: String },

    /// Terminal or file IO
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard Result type for graytail operations.
pub type Result<T> = std::result::Result<T, GraytailError>;

/// How prominently an error should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Transient,
    Prominent,
}

impl GraytailError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn ui(message: impl Into<String>) -> Self {
        Self::UIError {
            message: message.into(),
        }
    }

    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::Auth { status, body },
            _ => Self::Backend { status, body },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Auth failures need the user's attention; everything else is expected to clear
    /// up on a later poll.
    pub fn status_kind(&self) -> StatusKind {
        if self.is_auth() {
            StatusKind::Prominent
        } else {
            StatusKind::Transient
        }
    }
}

impl From<reqwest::Error> for GraytailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GraytailError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}
