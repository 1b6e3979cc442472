// ── Runtime connection configuration ──
//
// These types describe *how* to reach a vendtrack backend. They carry
// credential data, transport tuning and cache sizing, but never touch
// disk: the CLI builds a `ClientConfig` and hands it in.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use vendtrack_api::{
    ApiClient, CacheStore, DEFAULT_LOGOUT_REDIRECT, DEFAULT_TTL, HttpClient, TlsMode,
    TransportConfig,
};

use crate::error::CoreError;

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username/password pair exchanged for a JWT pair at `/token/`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for talking to one backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (e.g., `http://localhost:8000/api`).
    pub api_url: Url,
    /// Credentials for an automatic login on connect. `None` = anonymous.
    pub credentials: Option<Credentials>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Lifetime of a cached response.
    pub cache_ttl: Duration,
    /// Route published when the session ends.
    pub logout_redirect: String,
}

impl ClientConfig {
    /// Anonymous, strictly verified config for `api_url` with the stock
    /// timeout, cache lifetime and logout route.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_TTL,
            logout_redirect: DEFAULT_LOGOUT_REDIRECT.to_owned(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }

    /// Build the cache-aware API client this configuration describes.
    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        let http = HttpClient::new(self.api_url.as_str(), &self.transport())?
            .with_logout_redirect(self.logout_redirect.clone());
        Ok(ApiClient::from_parts(
            http,
            Arc::new(CacheStore::with_ttl(self.cache_ttl)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> Url {
        Url::parse("http://localhost:8000/api/").unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn defaults_match_backend_conventions() {
        let config = ClientConfig::new(local());
        assert_eq!(config.cache_ttl, Duration::from_secs(7200));
        assert_eq!(config.logout_redirect, "/home");
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn built_client_uses_configured_ttl() {
        let config = ClientConfig {
            cache_ttl: Duration::from_secs(60),
            ..ClientConfig::new(local())
        };
        let client = config.build_client().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(client.cache().ttl(), Duration::from_secs(60));
    }
}
