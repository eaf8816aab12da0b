//! # Client Error Types
//!
//! The error taxonomy for everything that crosses the network boundary.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local          │  │   Remote        │  │   Cancellation          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Api (status +  │  │  Superseded             │ │
//! │  │  Order          │  │   message +     │  │  (newer request won;    │ │
//! │  │  Payment        │  │   field details)│  │   intentionally         │ │
//! │  │  InvalidConfig  │  │  Network        │  │   ignorable)            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │  Session        │   NotAuthenticated / SessionExpired: the only     │
//! │  │                 │   errors that reset state (forced logout)          │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried automatically; callers present errors and decide.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use tillpoint_core::error::{OrderError, PaymentError, ValidationError};
use tillpoint_store::StoreError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Structured error body returned by the remote API.
///
/// Surfaced verbatim to the caller; the server's message is the user-facing
/// message.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,

    /// Optional per-field messages for form errors.
    #[serde(default)]
    pub details: HashMap<String, String>,
}

/// Client error type covering the taxonomy above.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Field-level validation failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Order engine rejected the mutation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Payment reconciliation failed; nothing was sent.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Client configuration is unusable.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// Structured server rejection.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: HashMap<String, String>,
    },

    /// Transport-level failure (DNS, connect, timeout, malformed body).
    #[error("Network error: {0}")]
    Network(String),

    // =========================================================================
    // Cancellation
    // =========================================================================
    /// A newer request superseded this one; the result must not be applied.
    #[error("Request superseded by a newer one")]
    Superseded,

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No credential is present; the caller must log in first.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Renewal failed and the session was cleared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    // =========================================================================
    // Persistence
    // =========================================================================
    /// The local key-value store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    // =========================================================================
    // Internal
    // =========================================================================
    /// Invariant violation inside the client (serialization of own types,
    /// poisoned state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Builds an API error from a response status and decoded body.
    pub fn api(status: u16, body: ApiErrorBody) -> Self {
        ClientError::Api {
            status,
            message: if body.message.is_empty() {
                format!("Request failed with status {}", status)
            } else {
                body.message
            },
            details: body.details,
        }
    }

    /// True for intentional supersede-by-newer-request cancellation; safe to
    /// ignore silently.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ClientError::Superseded)
    }

    /// True for transport failures worth a generic "try again" message (a
    /// human retry, never an automatic one).
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// True when the error forces a state reset rather than a message.
    pub fn is_session_reset(&self) -> bool {
        matches!(self, ClientError::SessionExpired(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Internal(format!("serialization failed: {}", err))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
