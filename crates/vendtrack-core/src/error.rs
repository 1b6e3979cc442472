// ── Core error types ──
//
// User-facing errors from vendtrack-core. Loaders and the restock form
// never hand raw HTTP errors to consumers; the `From<vendtrack_api::Error>`
// impl translates transport-layer failures into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- please log in again")]
    SessionExpired,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("{message}")]
    Validation { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Short message suitable for an on-screen error banner.
    ///
    /// Server validation messages pass through verbatim; everything else
    /// uses the `Display` text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } | Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` when the user has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::SessionExpired
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vendtrack_api::Error> for CoreError {
    fn from(err: vendtrack_api::Error) -> Self {
        match err {
            vendtrack_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            vendtrack_api::Error::SessionExpired => CoreError::SessionExpired,
            vendtrack_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "Not logged in".into(),
            },
            vendtrack_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        path: e.url().map(|u| u.path().to_owned()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            vendtrack_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            vendtrack_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            vendtrack_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { path: message },
            vendtrack_api::Error::Api {
                status, message, ..
            } if (400..500).contains(&status) => CoreError::Validation { message },
            vendtrack_api::Error::Api { status, message, .. } => CoreError::Api {
                message,
                status: Some(status),
            },
            vendtrack_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            vendtrack_api::Error::Serialization(message) => CoreError::Internal(message),
        }
    }
}
