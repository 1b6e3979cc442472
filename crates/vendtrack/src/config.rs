//! CLI configuration: thin wrapper around `vendtrack_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --username, --timeout, ...).

use vendtrack_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use vendtrack_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, resolve_password,
    save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// The active profile with CLI flag overrides applied.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub profile: Profile,
    defaults: Defaults,
    insecure: bool,
}

impl ResolvedProfile {
    /// Client config including credentials; a configured username without
    /// a resolvable password is an error.
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        self.build(&self.profile)
    }

    /// Client config that never logs in on its own.
    pub fn anonymous_client_config(&self) -> Result<ClientConfig, CliError> {
        let profile = Profile {
            username: None,
            ..self.profile.clone()
        };
        self.build(&profile)
    }

    fn build(&self, profile: &Profile) -> Result<ClientConfig, CliError> {
        let mut client =
            vendtrack_config::profile_to_client_config(profile, &self.name, &self.defaults)?;
        if self.insecure {
            client.tls = TlsVerification::DangerAcceptInvalid;
        }
        Ok(client)
    }
}

/// Look up the active profile and apply flag overrides.
///
/// Without a matching profile, `--api-url` alone is enough; an explicitly
/// requested profile must exist.
pub fn resolve_profile(global: &GlobalOpts) -> Result<ResolvedProfile, CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: cfg.available_profiles(),
            });
        }
        None => {
            let url = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            Profile::new(url)
        }
    };

    Ok(ResolvedProfile {
        name,
        profile: apply_overrides(profile, global),
        defaults: cfg.defaults,
        insecure: global.insecure,
    })
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}
