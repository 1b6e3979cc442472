// Cache-aware resource client.
//
// Reads go through the response cache (read-through, cache write after the
// response). Writes hit the network first and invalidate their family and
// its dependent report views only once the backend has confirmed them.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheKey, CacheStats, CacheStore, ResourceFamily};
use crate::error::Error;
use crate::http::HttpClient;
use crate::models::Listing;
use crate::params::QueryParams;
use crate::transport::TransportConfig;

/// Async client for the vendtrack REST backend.
///
/// Cheap to share behind an `Arc`; the cache store is itself shared so
/// several clients (or a client and a test) can observe the same entries.
pub struct ApiClient {
    http: HttpClient,
    cache: Arc<CacheStore>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build with a fresh cache using the default 2-hour TTL.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_parts(
            HttpClient::new(base_url, transport)?,
            Arc::new(CacheStore::new()),
        ))
    }

    /// Wrap an existing `reqwest::Client` (tests, custom middleware).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self::from_parts(
            HttpClient::from_reqwest(base_url, http)?,
            Arc::new(CacheStore::new()),
        ))
    }

    pub fn from_parts(http: HttpClient, cache: Arc<CacheStore>) -> Self {
        Self { http, cache }
    }

    /// Replace the cache store (e.g. one built with a configured TTL).
    pub fn with_cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    /// The auth-aware transport underneath: login, logout, session state.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Cache-aware GET returning the raw JSON body.
    ///
    /// With `skip_cache` the lookup is bypassed but the fresh body still
    /// replaces whatever was cached under the same key.
    pub async fn read(
        &self,
        path: &str,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Value, Error> {
        let key = CacheKey::new(path, params);

        if !skip_cache {
            if let Some(hit) = self.cache.get(key.as_str()) {
                debug!(key = %key, "served from cache");
                return Ok(hit);
            }
        }

        let body: Value = self.http.request(Method::GET, path, params, None).await?;
        self.cache.set(key, body.clone());
        Ok(body)
    }

    /// Cache-aware GET decoded into `T`.
    pub async fn read_as<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<T, Error> {
        let body = self.read(path, params, skip_cache).await?;
        decode_value(&body)
    }

    /// Cache-aware GET of a collection, normalizing `{results}` and bare
    /// array responses into one list.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<T>, Error> {
        let listing: Listing<T> = self.read_as(path, params, skip_cache).await?;
        Ok(listing.into_vec())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// `POST` to `path`; invalidates `family` on success.
    pub async fn create<T, B>(&self, family: ResourceFamily, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.write(Method::POST, family, path, Some(&encode_body(body)?))
            .await
    }

    /// `PUT` to `path`; invalidates `family` on success.
    pub async fn update<T, B>(&self, family: ResourceFamily, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.write(Method::PUT, family, path, Some(&encode_body(body)?))
            .await
    }

    /// `PATCH` to `path`; invalidates `family` on success.
    pub async fn patch<T, B>(&self, family: ResourceFamily, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.write(Method::PATCH, family, path, Some(&encode_body(body)?))
            .await
    }

    /// Bodiless `POST` action (e.g. `toggle_active`); invalidates on success.
    pub async fn action<T: DeserializeOwned>(
        &self,
        family: ResourceFamily,
        path: &str,
    ) -> Result<T, Error> {
        self.write(Method::POST, family, path, None).await
    }

    /// `DELETE` `path`; invalidates `family` on success.
    pub async fn remove(&self, family: ResourceFamily, path: &str) -> Result<(), Error> {
        self.http
            .request_empty(Method::DELETE, path, &QueryParams::new(), None)
            .await?;
        self.invalidate_family(family);
        Ok(())
    }

    async fn write<T: DeserializeOwned>(
        &self,
        method: Method,
        family: ResourceFamily,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let result = self
            .http
            .request(method, path, &QueryParams::new(), body)
            .await?;
        self.invalidate_family(family);
        Ok(result)
    }

    // ── Cache control ────────────────────────────────────────────────

    /// Drop every entry made stale by a write to `family`.
    pub fn invalidate_family(&self, family: ResourceFamily) -> usize {
        family
            .invalidation_patterns()
            .into_iter()
            .map(|pattern| self.cache.invalidate(pattern))
            .sum()
    }

    /// Remove every cached entry whose key contains `pattern`.
    pub fn invalidate_cache(&self, pattern: &str) -> usize {
        self.cache.invalidate(pattern)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))
}

fn decode_value<T: DeserializeOwned>(body: &Value) -> Result<T, Error> {
    T::deserialize(body).map_err(|e| {
        let raw = body.to_string();
        let preview: String = raw.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: raw,
        }
    })
}
