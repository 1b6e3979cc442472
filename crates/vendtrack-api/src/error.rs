use std::collections::BTreeMap;

use thiserror::Error;

/// Top-level error type for the `vendtrack-api` crate.
///
/// Covers every failure mode of the REST surface: authentication,
/// transport, server-side rejections, and response decoding.
/// `vendtrack-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or token request rejected by the backend.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The refresh token was rejected; all credentials have been dropped.
    #[error("Session expired -- please log in again")]
    SessionExpired,

    /// An operation needed a token but none is held.
    #[error("Not authenticated")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server-side ─────────────────────────────────────────────────
    /// Non-success response from the backend.
    ///
    /// `field_errors` holds the per-field messages of a validation
    /// response (`{"name": ["This field is required."]}`), when present.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::SessionExpired | Self::NotAuthenticated
        )
    }

    /// Returns `true` for failures worth re-triggering manually.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server's field-level validation messages joined into one
    /// readable line, e.g. `name: This field is required.; sku: Too long.`
    pub fn field_summary(&self) -> Option<String> {
        match self {
            Self::Api { field_errors, .. } if !field_errors.is_empty() => Some(
                field_errors
                    .iter()
                    .map(|(field, msgs)| format!("{field}: {}", msgs.join(" ")))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}
