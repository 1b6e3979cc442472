// vendtrack-api: async REST client for the vendtrack backend.
//
// Three layers, leaves first:
// - `HttpClient` attaches bearer tokens and performs the one-time
//   refresh-and-retry on 401.
// - `CacheStore` holds JSON responses for a fixed TTL, keyed by path and
//   canonicalized query parameters.
// - `ApiClient` exposes one method per resource; reads go through the
//   cache, writes invalidate the affected resource families afterwards.

pub mod auth;
pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod params;
pub mod resources;
pub mod transport;

pub use auth::{DEFAULT_LOGOUT_REDIRECT, LogoutReason, SessionState, TokenPair};
pub use cache::{
    AggregateView, CacheKey, CacheStats, CacheStore, DEFAULT_TTL, INVALIDATION_TABLE, ResourceFamily,
};
pub use client::ApiClient;
pub use error::Error;
pub use http::HttpClient;
pub use models::*;
pub use params::QueryParams;
pub use resources::reports::{
    DashboardSummary, DemandAnalysis, Metric, RevenueProfit, StockLevels, UnitCount,
};
pub use transport::{TlsMode, TransportConfig};
