// ── Session ──
//
// Entry point for consumers: owns the configured API client, performs the
// optional credential login, and hands out screen loaders that share one
// response cache.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info};
use vendtrack_api::{ApiClient, CacheStats, SessionState, UserProfile};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::loaders::{AnalyticsLoader, DashboardLoader, InventoryLoader};
use crate::restock::RestockEditor;

/// Cheaply cloneable handle to one backend session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: ClientConfig,
    api: Arc<ApiClient>,
    skip_cache: bool,
}

impl Session {
    /// Build the client described by `config`. Does NOT log in; call
    /// [`connect()`](Self::connect).
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let api = Arc::new(config.build_client()?);
        Ok(Self::from_client(config, api))
    }

    /// Wrap an already-built client (tests, custom transports).
    pub fn from_client(config: ClientConfig, api: Arc<ApiClient>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                api,
                skip_cache: false,
            }),
        }
    }

    /// Every loader created afterwards bypasses cache lookups.
    pub fn with_skip_cache(self, skip_cache: bool) -> Self {
        let inner = SessionInner {
            config: self.inner.config.clone(),
            api: Arc::clone(&self.inner.api),
            skip_cache,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.inner.api
    }

    pub fn skip_cache(&self) -> bool {
        self.inner.skip_cache
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with the configured credentials, if any.
    ///
    /// Returns the profile of the logged-in user, or `None` for an
    /// anonymous session.
    pub async fn connect(&self) -> Result<Option<UserProfile>, CoreError> {
        let Some(creds) = &self.inner.config.credentials else {
            debug!("no credentials configured, staying anonymous");
            return Ok(None);
        };
        self.login(&creds.username, &creds.password).await.map(Some)
    }

    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserProfile, CoreError> {
        let profile = self.inner.api.http().login(username, password).await?;
        info!(user = %profile.username, "logged in");
        Ok(profile)
    }

    /// Drop the tokens and return the route to navigate to.
    pub fn logout(&self) -> String {
        self.inner.api.http().logout()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.api.http().is_authenticated()
    }

    pub fn current_user(&self) -> Option<Arc<UserProfile>> {
        self.inner.api.http().current_user()
    }

    pub fn session_state(&self) -> SessionState {
        self.inner.api.http().session_state()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<SessionState> {
        self.inner.api.http().subscribe_session()
    }

    // ── Screens ──────────────────────────────────────────────────────

    pub fn inventory(&self) -> InventoryLoader {
        InventoryLoader::new(Arc::clone(&self.inner.api)).with_skip_cache(self.inner.skip_cache)
    }

    pub fn analytics(&self) -> AnalyticsLoader {
        AnalyticsLoader::new(Arc::clone(&self.inner.api)).with_skip_cache(self.inner.skip_cache)
    }

    pub fn dashboard(&self) -> DashboardLoader {
        DashboardLoader::new(Arc::clone(&self.inner.api)).with_skip_cache(self.inner.skip_cache)
    }

    pub fn restock_editor(&self) -> RestockEditor {
        RestockEditor::new(Arc::clone(&self.inner.api))
    }

    // ── Cache control ────────────────────────────────────────────────

    pub fn invalidate_cache(&self, pattern: &str) -> usize {
        self.inner.api.invalidate_cache(pattern)
    }

    pub fn clear_cache(&self) {
        self.inner.api.clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.api.cache_stats()
    }
}
