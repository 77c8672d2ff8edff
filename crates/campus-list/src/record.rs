use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a listed row, as used by the selection set.
///
/// Rows are raw JSON, so ids are either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Reads an id out of a JSON value. Floats, booleans, null and
    /// containers are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for RecordId {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_accepts_integers_and_strings() {
        assert_eq!(RecordId::from_value(&json!(7)), Some(RecordId::Number(7)));
        assert_eq!(
            RecordId::from_value(&json!("SV01")),
            Some(RecordId::Text("SV01".into()))
        );
    }

    #[test]
    fn test_from_value_rejects_other_shapes() {
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!(1.5)), None);
        assert_eq!(RecordId::from_value(&json!({"id": 1})), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordId::from(12).to_string(), "12");
        assert_eq!(RecordId::from("abc").to_string(), "abc");
    }
}
