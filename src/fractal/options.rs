//! Typed, defaulting view over request query parameters.
//!
//! Every option arrives as a string pair from the query string. Keys may repeat;
//! accessors always read the first value. Numeric accessors never fail: a
//! missing or malformed value yields the caller's default and is logged.

use std::str::FromStr;

use tracing::{trace, warn};

/// Query options for a single render request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pairs: Vec<(String, String)>,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (still percent-encoded) query string, without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Build options from already-decoded pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Integer value for `key`, or `default` when absent or unparseable.
    pub fn integer(&self, key: &str, default: i64) -> i64 {
        self.parse_or(key, default)
    }

    /// Float value for `key`, or `default` when absent or unparseable.
    pub fn float(&self, key: &str, default: f64) -> f64 {
        self.parse_or(key, default)
    }

    /// Number of key/value pairs, counting repeated keys.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over all pairs in query order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Copy + std::fmt::Display,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.get(key) else {
            trace!(key, %default, "Option absent, using default");
            return default;
        };

        match raw.parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = raw, %default, "Failed to parse option: {}", e);
                default
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
