// Auth-aware HTTP adapter for the vendtrack REST backend.
//
// Base path: whatever `api_url` points at (usually `https://host/api/`)
// Auth: `Authorization: Bearer <access>`; JWT pair from `/token/`
//
// A 401 with a refresh token held triggers exactly one refresh and one
// retry of the original request. Concurrent 401s queue on a single
// refresh lock; whoever arrives after a completed refresh just retries.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{
    AccessToken, DEFAULT_LOGOUT_REDIRECT, LogoutReason, SessionPublisher, SessionState, TokenPair,
    TokenStore,
};
use crate::error::Error;
use crate::models::UserProfile;
use crate::params::QueryParams;
use crate::transport::TransportConfig;

const TOKEN_PATH: &str = "token/";
const TOKEN_REFRESH_PATH: &str = "token/refresh/";
const PROFILE_PATH: &str = "profile/";

// ── Client ───────────────────────────────────────────────────────────

/// Low-level client: URL joining, bearer auth, 401 recovery, error parsing.
///
/// Knows nothing about caching; [`crate::ApiClient`] layers that on top.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    session: SessionPublisher,
    logout_redirect: String,
}

impl HttpClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            tokens: TokenStore::new(),
            session: SessionPublisher::new(),
            logout_redirect: DEFAULT_LOGOUT_REDIRECT.to_owned(),
        })
    }

    /// Route published in [`SessionState::LoggedOut`] when a session ends.
    pub fn with_logout_redirect(mut self, route: impl Into<String>) -> Self {
        self.logout_redirect = route.into();
        self
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path (`/locations/` or `locations/`) onto the base.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Exchange credentials for a token pair, then fetch the profile.
    ///
    /// On a rejected login the backend's `detail` is surfaced, falling
    /// back to "Login failed".
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<UserProfile, Error> {
        let url = self.url(TOKEN_PATH)?;
        debug!("POST {url} (login as {username})");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let resp = self.http.post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&raw)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| "Login failed".to_owned());
            return Err(Error::Authentication { message });
        }

        let pair: TokenPair = Self::decode(resp).await?;
        self.set_tokens(pair);
        info!(username, "logged in");

        self.fetch_profile().await
    }

    /// `GET /profile/`; publishes the user into the session state.
    pub async fn fetch_profile(&self) -> Result<UserProfile, Error> {
        if self.tokens.access().is_none() {
            return Err(Error::NotAuthenticated);
        }
        let profile: UserProfile = self
            .request(Method::GET, PROFILE_PATH, &QueryParams::new(), None)
            .await?;
        self.session.publish(SessionState::Authenticated {
            user: Some(Arc::new(profile.clone())),
        });
        Ok(profile)
    }

    /// Install an existing token pair (e.g. handed over from another client).
    pub fn set_tokens(&self, pair: TokenPair) {
        self.tokens.set_pair(pair);
        self.session
            .publish(SessionState::Authenticated { user: None });
    }

    /// Drop all credentials. Returns the route the caller should show next.
    pub fn logout(&self) -> String {
        self.tokens.clear();
        self.session.publish(SessionState::LoggedOut {
            redirect: self.logout_redirect.clone(),
            reason: LogoutReason::UserRequested,
        });
        info!("logged out");
        self.logout_redirect.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access().is_some()
    }

    pub fn current_user(&self) -> Option<Arc<UserProfile>> {
        match self.session.current() {
            SessionState::Authenticated { user } => user,
            _ => None,
        }
    }

    pub fn session_state(&self) -> SessionState {
        self.session.current()
    }

    /// Watch channel that sees every session transition.
    pub fn subscribe_session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    // ── Request pipeline ─────────────────────────────────────────────

    /// Send a request and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let resp = self.execute(&method, path, query, body).await?;
        Self::handle_response(resp).await
    }

    /// Send a request whose success body is ignored (e.g. DELETE → 204).
    pub async fn request_empty(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<(), Error> {
        let resp = self.execute(&method, path, query, body).await?;
        Self::handle_empty(resp).await
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        if query.is_empty() {
            debug!("{method} {url}");
        } else {
            debug!("{method} {url} params={}", query.to_query_string());
        }

        let seen_generation = self.tokens.generation();
        let resp = self.dispatch(method, &url, query, body).await?;

        if resp.status() != StatusCode::UNAUTHORIZED || !self.tokens.has_refresh() {
            return Ok(resp);
        }

        debug!("401 from {url}, refreshing access token");
        self.refresh_access(seen_generation).await?;

        // A second 401 is returned as-is and becomes a terminal
        // `Authentication` error in `parse_error`.
        self.dispatch(method, &url, query, body).await
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &Url,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let mut req = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            req = req.query(&query.pairs());
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = self.tokens.access() {
            req = req.bearer_auth(token.expose_secret());
        }
        Ok(req.send().await?)
    }

    /// Single-flight token refresh.
    ///
    /// `seen_generation` is the token generation the failed request was
    /// sent with. If it moved while we waited for the lock, another task
    /// already refreshed (or the session ended) and no new call is made.
    async fn refresh_access(&self, seen_generation: u64) -> Result<(), Error> {
        let _guard = self.tokens.refresh_lock.lock().await;

        if self.tokens.generation() != seen_generation {
            return if self.tokens.access().is_some() {
                Ok(())
            } else {
                Err(Error::SessionExpired)
            };
        }

        let Some(refresh) = self.tokens.refresh() else {
            return Err(Error::SessionExpired);
        };

        let url = self.url(TOKEN_REFRESH_PATH)?;
        debug!("POST {url}");
        let outcome = self
            .http
            .post(url)
            .json(&json!({ "refresh": refresh.expose_secret() }))
            .send()
            .await;

        match outcome {
            Ok(resp) if resp.status().is_success() => match Self::decode::<AccessToken>(resp).await {
                Ok(token) => {
                    self.tokens.set_access(token.access);
                    info!("access token refreshed");
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "unreadable token refresh response");
                    self.expire_session();
                    Err(Error::SessionExpired)
                }
            },
            Ok(resp) => {
                warn!(status = %resp.status(), "token refresh rejected");
                self.expire_session();
                Err(Error::SessionExpired)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                self.expire_session();
                Err(Error::SessionExpired)
            }
        }
    }

    fn expire_session(&self) {
        self.tokens.clear();
        self.session.publish(SessionState::LoggedOut {
            redirect: self.logout_redirect.clone(),
            reason: LogoutReason::SessionExpired,
        });
        info!(redirect = %self.logout_redirect, "session expired");
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            Self::decode(resp).await
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<Value>(&raw).ok();
        let (message, field_errors) = parsed.as_ref().map_or_else(
            || (None, BTreeMap::new()),
            extract_error_message,
        );

        if status == StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: message.unwrap_or_else(|| "authentication required".to_owned()),
            };
        }

        let message = message.unwrap_or_else(|| {
            let canonical = status.canonical_reason().unwrap_or("request failed");
            format!("{} {canonical}", status.as_u16())
        });

        Error::Api {
            status: status.as_u16(),
            message,
            field_errors,
        }
    }
}

// ── Error body parsing ───────────────────────────────────────────────

/// Pull a readable message out of a JSON error body.
///
/// Precedence: per-field validation messages joined as
/// `field: msg; field: msg`, then `error`, then `detail`.
fn extract_error_message(body: &Value) -> (Option<String>, BTreeMap<String, Vec<String>>) {
    let Value::Object(map) = body else {
        return (body.as_str().map(str::to_owned), BTreeMap::new());
    };

    let mut fields = BTreeMap::new();
    for (key, value) in map {
        if key == "error" || key == "detail" || key == "code" {
            continue;
        }
        let msgs: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        };
        if !msgs.is_empty() {
            fields.insert(key.clone(), msgs);
        }
    }

    let message = if fields.is_empty() {
        map.get("error")
            .or_else(|| map.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    } else {
        Some(
            fields
                .iter()
                .map(|(field, msgs)| format!("{field}: {}", msgs.join(" ")))
                .collect::<Vec<_>>()
                .join("; "),
        )
    };

    (message, fields)
}
