// Bearer-token state shared by every request.
//
// The access/refresh pair lives in memory only. A generation counter is
// bumped on every token change so a request that saw a 401 can tell
// whether another task already refreshed while it waited for the lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use serde::Deserialize;
use tokio::sync::{Mutex, watch};

use crate::models::UserProfile;

/// Landing route published when a session ends.
pub const DEFAULT_LOGOUT_REDIRECT: &str = "/home";

/// Response of `POST /token/`.
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: SecretString,
    pub refresh: SecretString,
}

/// Response of `POST /token/refresh/`.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessToken {
    pub access: SecretString,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// `logout()` was called.
    UserRequested,
    /// The refresh token was rejected.
    SessionExpired,
}

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No credentials have been supplied yet.
    Anonymous,
    /// Tokens are held. `user` is filled once the profile is fetched.
    Authenticated { user: Option<Arc<UserProfile>> },
    /// Credentials were dropped; the caller should navigate to `redirect`.
    LoggedOut {
        redirect: String,
        reason: LogoutReason,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// In-memory token holder.
pub(crate) struct TokenStore {
    access: RwLock<Option<SecretString>>,
    refresh: RwLock<Option<SecretString>>,
    generation: AtomicU64,
    /// Held for the duration of a refresh so concurrent 401s share one.
    pub(crate) refresh_lock: Mutex<()>,
}

impl TokenStore {
    pub(crate) fn new() -> Self {
        Self {
            access: RwLock::new(None),
            refresh: RwLock::new(None),
            generation: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
        }
    }

    pub(crate) fn access(&self) -> Option<SecretString> {
        self.access
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn refresh(&self) -> Option<SecretString> {
        self.refresh
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn has_refresh(&self) -> bool {
        self.refresh
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn set_pair(&self, pair: TokenPair) {
        *self.access.write().unwrap_or_else(PoisonError::into_inner) = Some(pair.access);
        *self.refresh.write().unwrap_or_else(PoisonError::into_inner) = Some(pair.refresh);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn set_access(&self, access: SecretString) {
        *self.access.write().unwrap_or_else(PoisonError::into_inner) = Some(access);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn clear(&self) {
        *self.access.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.refresh.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Publisher side of the session channel.
pub(crate) struct SessionPublisher {
    tx: watch::Sender<SessionState>,
}

impl SessionPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Anonymous);
        Self { tx }
    }

    pub(crate) fn publish(&self, state: SessionState) {
        self.tx.send_replace(state);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub(crate) fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access: SecretString::from(access.to_owned()),
            refresh: SecretString::from(refresh.to_owned()),
        }
    }

    #[test]
    fn every_change_bumps_generation() {
        let store = TokenStore::new();
        let g0 = store.generation();
        store.set_pair(pair("a", "r"));
        let g1 = store.generation();
        store.set_access(SecretString::from("a2".to_owned()));
        let g2 = store.generation();
        store.clear();
        assert!(g0 < g1 && g1 < g2 && g2 < store.generation());
    }

    #[test]
    fn clear_drops_both_tokens() {
        let store = TokenStore::new();
        store.set_pair(pair("a", "r"));
        assert_eq!(store.access().map(|s| s.expose_secret().to_owned()), Some("a".into()));
        store.clear();
        assert!(store.access().is_none());
        assert!(!store.has_refresh());
    }

    #[test]
    fn subscribers_see_latest_state() {
        let publisher = SessionPublisher::new();
        let rx = publisher.subscribe();
        publisher.publish(SessionState::LoggedOut {
            redirect: DEFAULT_LOGOUT_REDIRECT.into(),
            reason: LogoutReason::SessionExpired,
        });
        assert!(matches!(
            &*rx.borrow(),
            SessionState::LoggedOut { redirect, .. } if redirect == "/home"
        ));
    }
}
