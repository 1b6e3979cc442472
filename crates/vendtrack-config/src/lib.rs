//! Shared configuration for vendtrack tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `vendtrack_core::ClientConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use vendtrack_core::{ClientConfig, Credentials, TlsVerification};

/// Service name for secrets stored in the system keyring.
pub const KEYRING_SERVICE: &str = "vendtrack";

/// Prefix for environment overrides (`VENDTRACK_DEFAULTS__TIMEOUT=60`).
pub const ENV_PREFIX: &str = "VENDTRACK_";

/// Password consulted for every profile that has no `password_env`.
pub const PASSWORD_ENV: &str = "VENDTRACK_PASSWORD";

/// Username fallback when a profile names none.
pub const USERNAME_ENV: &str = "VENDTRACK_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password available for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Resolve the active profile name: explicit request, then
    /// `default_profile`, then `"default"`.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated profile names, or `(none)`.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Cached response lifetime in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    7200
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API root, e.g. "https://ops.example.com/api/".
    pub api_url: String,

    /// Login name. Without one the session stays anonymous.
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    pub cache_ttl: Option<u64>,

    /// Route reported after logout.
    pub logout_redirect: Option<String>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            cache_ttl: None,
            logout_redirect: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vendtrack", "vendtrack").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vendtrack");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then
/// `VENDTRACK_` variables with `__` separating nested keys.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_key(profile_name))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve a password: the profile's `password_env`, then
/// `VENDTRACK_PASSWORD`, then the keyring, then plaintext config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    let env_name = profile.password_env.as_deref().unwrap_or(PASSWORD_ENV);
    if let Ok(pw) = std::env::var(env_name) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_key(profile_name)) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Username and password for a profile, or `None` for an anonymous one.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
    else {
        return Ok(None);
    };
    let password = resolve_password(profile, profile_name)?;
    Ok(Some(Credentials { username, password }))
}

/// Build a `ClientConfig` from a profile, with `defaults` filling the
/// fields the profile leaves unset. No CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ClientConfig::new(api_url);
    config.credentials = credentials;
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.cache_ttl = Duration::from_secs(profile.cache_ttl.unwrap_or(defaults.cache_ttl));
    if let Some(ref route) = profile.logout_redirect {
        config.logout_redirect.clone_from(route);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_profile_name_falls_back() {
        let mut cfg = Config::default();
        assert_eq!(cfg.profile_name(None), "default");
        assert_eq!(cfg.profile_name(Some("route-a")), "route-a");
        cfg.default_profile = None;
        assert_eq!(cfg.profile_name(None), "default");
    }

    #[test]
    fn missing_profile_lists_available() {
        let mut cfg = Config::default();
        let err = cfg.profile("prod").err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("profile 'prod' not found"));

        cfg.profiles.insert("a".into(), Profile::new("http://a/api/"));
        cfg.profiles.insert("b".into(), Profile::new("http://b/api/"));
        assert_eq!(cfg.available_profiles(), "a, b");
    }

    #[test]
    fn anonymous_profile_maps_defaults() {
        let profile = Profile::new("https://ops.example.com/api/");
        let defaults = Defaults {
            timeout: 12,
            ..Defaults::default()
        };
        let client = profile_to_client_config(&profile, "ops", &defaults)
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(client.api_url.as_str(), "https://ops.example.com/api/");
        assert!(client.credentials.is_none());
        assert_eq!(client.tls, TlsVerification::SystemDefaults);
        assert_eq!(client.timeout, Duration::from_secs(12));
        assert_eq!(client.cache_ttl, Duration::from_secs(7200));
        assert_eq!(client.logout_redirect, "/home");
    }

    #[test]
    fn profile_fields_override_defaults() {
        let profile = Profile {
            ca_cert: Some(PathBuf::from("/etc/ssl/ops.pem")),
            cache_ttl: Some(60),
            logout_redirect: Some("/login".into()),
            ..Profile::new("https://ops.example.com/api/")
        };
        let client = profile_to_client_config(&profile, "ops", &Defaults::default())
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(
            client.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/ops.pem"))
        );
        assert_eq!(client.cache_ttl, Duration::from_secs(60));
        assert_eq!(client.logout_redirect, "/login");
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let profile = Profile {
            ca_cert: Some(PathBuf::from("/etc/ssl/ops.pem")),
            insecure: Some(true),
            ..Profile::new("https://ops.example.com/api/")
        };
        let client = profile_to_client_config(&profile, "ops", &Defaults::default())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(client.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let profile = Profile::new("not a url");
        let err = profile_to_client_config(&profile, "ops", &Defaults::default());
        assert!(matches!(
            err,
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
    }
}
