// ── Response cache ──
//
// Time-boxed, in-memory JSON cache for GET responses plus the static table
// describing which cached views each write makes stale.

mod family;
mod key;
mod store;

pub use family::{AggregateView, INVALIDATION_TABLE, ResourceFamily};
pub use key::CacheKey;
pub use store::{CacheStats, CacheStore, DEFAULT_TTL};
