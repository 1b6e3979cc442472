use std::fmt;

use crate::params::QueryParams;

/// Deterministic cache key for a GET request.
///
/// Rendered as `path` or `path?sorted-query`. Because [`QueryParams`]
/// iterates in key order, parameter insertion order never affects the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(path: &str, params: &QueryParams) -> Self {
        if params.is_empty() {
            Self(path.to_owned())
        } else {
            Self(format!("{path}?{}", params.to_query_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring match used by pattern invalidation.
    pub fn matches(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_pairs_in_any_order_give_same_key() {
        let mut a = QueryParams::new();
        a.insert("location", 3);
        a.insert("days", 30);
        a.insert("product", 12);

        let mut b = QueryParams::new();
        b.insert("product", 12);
        b.insert("location", 3);
        b.insert("days", 30);

        assert_eq!(
            CacheKey::new("/analytics/demand/", &a),
            CacheKey::new("/analytics/demand/", &b)
        );
    }

    #[test]
    fn different_values_give_different_keys() {
        let a = QueryParams::new().with("location", 3);
        let b = QueryParams::new().with("location", 4);
        assert_ne!(
            CacheKey::new("/machines/", &a),
            CacheKey::new("/machines/", &b)
        );
    }

    #[test]
    fn empty_params_render_bare_path() {
        let key = CacheKey::new("/locations/", &QueryParams::new());
        assert_eq!(key.as_str(), "/locations/");
    }

    #[test]
    fn rendered_key_includes_query() {
        let key = CacheKey::new("/products/", &QueryParams::new().with("location", 3));
        assert_eq!(key.as_str(), "/products/?location=3");
        assert!(key.matches("/products"));
        assert!(!key.matches("/locations"));
    }
}
