// Query parameter bag shared by every read.
//
// Backed by a BTreeMap so iteration is always key-sorted: two bags with
// the same pairs produce the same query string (and cache key) no matter
// which order the pairs were inserted in.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Filters, date ranges and pagination for a GET request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert that skips `None` and empty values.
    pub fn with_opt<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert_opt(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Insert only when a value is present and renders non-empty.
    ///
    /// Mirrors how filter forms behave: an unset or blank filter is not
    /// sent at all, rather than sent as `?location=`.
    pub fn insert_opt<V: Display>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(v) = value {
            let rendered = v.to_string();
            if !rendered.is_empty() {
                self.0.insert(key.into(), rendered);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Key-sorted `(key, value)` pairs, ready for `RequestBuilder::query`.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    /// Canonical `application/x-www-form-urlencoded` rendering.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_is_key_sorted() {
        let params = QueryParams::new()
            .with("location", 3)
            .with("end_date", "2025-01-31")
            .with("days", 7);
        assert_eq!(
            params.to_query_string(),
            "days=7&end_date=2025-01-31&location=3"
        );
    }

    #[test]
    fn insert_opt_skips_missing_and_blank() {
        let params = QueryParams::new()
            .with_opt("location", None::<i64>)
            .with_opt("product", Some(""))
            .with_opt("machine", Some(9));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("machine"), Some("9"));
    }

    #[test]
    fn values_are_form_encoded() {
        let params = QueryParams::new().with("search", "cola & chips");
        assert_eq!(params.to_query_string(), "search=cola+%26+chips");
    }
}
