//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vendtrack_config::ConfigError;
use vendtrack_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARTIAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(vendtrack::connection_failed),
        help(
            "Check that the backend is running and the API URL is right.\n\
             Reason: {reason}\n\
             Try: vendtrack --api-url http://localhost:8000/api/ dashboard"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(vendtrack::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(vendtrack::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             Run: vendtrack config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("Session expired")]
    #[diagnostic(code(vendtrack::session_expired), help("Run: vendtrack login"))]
    SessionExpired,

    #[error("No password available for profile '{profile}'")]
    #[diagnostic(
        code(vendtrack::no_credentials),
        help(
            "Store one with: vendtrack config set-password\n\
             Or set the VENDTRACK_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {path}")]
    #[diagnostic(code(vendtrack::not_found))]
    NotFound { path: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    #[diagnostic(code(vendtrack::api_error))]
    ApiError { status: Option<u16>, message: String },

    /// Some sections loaded, others did not; the loaded ones were printed.
    #[error("{message}")]
    #[diagnostic(
        code(vendtrack::partial),
        help("The sections that loaded are shown above. Rerun with -v for details.")
    )]
    Partial { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vendtrack::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vendtrack::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vendtrack config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(vendtrack::no_config),
        help(
            "Create one with: vendtrack config init\n\
             Or pass --api-url. Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(vendtrack::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(vendtrack::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render output: {0}")]
    Render(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::SessionExpired | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Partial { .. } => exit_code::PARTIAL,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::SessionExpired => Self::SessionExpired,
            CoreError::NotFound { path } => Self::NotFound { path },
            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => Self::ApiError { status, message },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<vendtrack_api::Error> for CliError {
    fn from(err: vendtrack_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let cases = [
            (CoreError::Timeout, exit_code::TIMEOUT),
            (CoreError::SessionExpired, exit_code::AUTH),
            (
                CoreError::NotFound {
                    path: "/machines/9/".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Validation {
                    message: "Please select a location".into(),
                },
                exit_code::USAGE,
            ),
            (CoreError::Internal("boom".into()), exit_code::GENERAL),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn api_error_shows_status_when_known() {
        let with = CliError::ApiError {
            status: Some(500),
            message: "oops".into(),
        };
        let without = CliError::ApiError {
            status: None,
            message: "oops".into(),
        };
        assert_eq!(with.to_string(), "API error (500): oops");
        assert_eq!(without.to_string(), "API error: oops");
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "prod".into(),
            available: "north, south".into(),
        });
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "north, south"));
    }
}
