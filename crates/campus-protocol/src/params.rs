//! Query parameters and list filters.
//!
//! Filters are an open-ended map from parameter name to a loosely typed
//! value. Two rules live here because every list screen depends on them:
//!
//! - **blank values are never sent**: `null` and `""` are dropped when
//!   building the query string, so an unset filter does not reach the
//!   backend as `?status=`;
//! - **meaningful values**: a value that is not blank, not `"all"` and not
//!   `0` counts as an active filter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single filter or query value.
///
/// `#[serde(untagged)]` keeps the JSON form natural (`"active"`, `3`,
/// `true`, `null`) instead of `{"Text": "active"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl ParamValue {
    /// `true` for values that must not be sent at all.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// `true` when this value actively narrows a listing.
    ///
    /// `"all"` and `0` are the conventional "no filter" choices of the
    /// portal's select boxes, so they do not count.
    pub fn is_meaningful(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(s) => !s.is_empty() && s != "all",
            Self::Number(n) => n.as_f64() != Some(0.0),
            Self::Bool(_) => true,
        }
    }

    /// The query-string rendering.
    pub fn to_query_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Named list filters. A `BTreeMap` so that the outgoing query string is
/// deterministic.
pub type Filters = BTreeMap<String, ParamValue>;

/// `true` if at least one filter actively narrows the listing.
pub fn has_meaningful(filters: &Filters) -> bool {
    filters.values().any(ParamValue::is_meaningful)
}

/// Renders parameters as query pairs, dropping blank values.
pub fn query_pairs(params: &Filters) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, v)| !v.is_blank())
        .map(|(k, v)| (k.clone(), v.to_query_value()))
        .collect()
}
