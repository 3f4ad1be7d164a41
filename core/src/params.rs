//! Query parameters for the search endpoints.

use std::collections::BTreeMap;

use crate::error::ApiError;

/// Page size used when the caller does not set `rows`.
pub const DEFAULT_ROWS: u64 = 500;

pub const ROWS: &str = "rows";
pub const START: &str = "start";

/// Parameter name to value, validated per call against an allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    values: BTreeMap<String, String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reject any parameter whose name is not in `allowed`.
    ///
    /// Both lists in the error are sorted.
    pub fn validate(&self, allowed: &[&str]) -> Result<(), ApiError> {
        let disallowed: Vec<String> = self
            .values
            .keys()
            .filter(|name| !allowed.contains(&name.as_str()))
            .cloned()
            .collect();
        if disallowed.is_empty() {
            return Ok(());
        }

        let mut allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
        allowed.sort();
        Err(ApiError::DisallowedParams {
            disallowed,
            allowed,
        })
    }

    /// Set `rows` to [`DEFAULT_ROWS`] unless the caller already did.
    pub fn default_rows(&mut self) {
        self.values
            .entry(ROWS.to_string())
            .or_insert_with(|| DEFAULT_ROWS.to_string());
    }

    /// Page size as a positive integer.
    pub fn rows(&self) -> Result<u64, ApiError> {
        let raw = self.get(ROWS).unwrap_or_default();
        match raw.trim().parse::<u64>() {
            Ok(rows) if rows > 0 => Ok(rows),
            _ => Err(ApiError::InvalidParam {
                name: ROWS.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = SearchParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
