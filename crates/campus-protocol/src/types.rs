//! Payload shapes used by the portal API.
//!
//! Every backend response is wrapped in the same envelope:
//!
//! ```json
//! { "status": true, "message": "optional", "data": ... }
//! ```
//!
//! Paginated listings put a second envelope inside `data`:
//!
//! ```json
//! { "status": true, "data": { "data": [ ... ], "from": 11, "total": 42 } }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Truthiness
// ---------------------------------------------------------------------------

/// Loose truthiness for flags the backend does not type strictly.
///
/// `status` usually arrives as a boolean, but some endpoints answer `1`
/// or `"1"`. Null, `false`, `0`, `NaN` and the empty string are false;
/// everything else (including empty arrays and objects) is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The standard response wrapper.
///
/// A missing `status` counts as failure, and `data: null` decodes to
/// `None`, so callers can tell an empty success apart from a populated
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub status: bool,

    #[serde(default)]
    pub message: Option<String>,

    /// A missing field decodes to `None` without requiring `T: Default`.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success with a body, the only shape callers should trust.
    pub fn into_success(self) -> Option<T> {
        if self.status { self.data } else { None }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// 1-based offset of the first row on this page. The backend sends
    /// `null` for an empty page.
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl Page<Value> {
    /// Reads the nested page out of an envelope's `data` value.
    ///
    /// Returns `None` when `data.data` is absent or falsy, i.e. the body
    /// is not a paginated envelope. A nested value that is not an array
    /// becomes a single-row page.
    pub fn extract(data: &Value) -> Option<Self> {
        let rows = data.get("data").filter(|v| is_truthy(v))?;
        Some(Self {
            data: coerce_rows(rows.clone()),
            from: data.get("from").and_then(Value::as_u64),
            total: data.get("total").and_then(Value::as_u64),
        })
    }
}

/// Turns a response body into a row list: arrays pass through, any other
/// value becomes a one-element list.
pub fn coerce_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        other => vec![other],
    }
}

// ---------------------------------------------------------------------------
// Token refresh
// ---------------------------------------------------------------------------

/// Body of `POST /refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// A freshly minted credential set, as returned by `/refresh` (and by the
/// login endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: u64,
}

impl TokenGrant {
    /// Absolute expiry (Unix epoch ms) given the current time.
    pub fn expires_at_ms(&self, now_ms: i64) -> i64 {
        let lifetime_ms = i64::try_from(self.expires_in.saturating_mul(1000)).unwrap_or(i64::MAX);
        now_ms.saturating_add(lifetime_ms)
    }
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// The shape of a non-2xx response body. Both fields are optional; the
/// backend sends `errors` on 422 and `message` on most other failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// Picks the first human-readable message out of a validation `errors`
/// value.
///
/// - a string is used as-is;
/// - an array yields its first element;
/// - an object yields the first message across its values, with array
///   values flattened one level (`{"name": ["required"]}` → `"required"`).
pub fn first_error_message(errors: &Value) -> Option<String> {
    match errors {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().map(render_message),
        Value::Object(fields) => fields
            .values()
            .flat_map(|v| match v {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .next()
            .map(render_message),
        _ => None,
    }
}

fn render_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy_follows_loose_rules() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_envelope_missing_status_is_failure() {
        let env: Envelope<Value> = serde_json::from_value(json!({"data": [1]})).unwrap();
        assert!(!env.status);
        assert_eq!(env.into_success(), None);
    }

    #[test]
    fn test_envelope_numeric_status_is_truthy() {
        let env: Envelope<Value> =
            serde_json::from_value(json!({"status": 1, "data": {"a": 1}})).unwrap();
        assert!(env.status);
    }

    #[test]
    fn test_envelope_null_data_is_none() {
        let env: Envelope<Value> =
            serde_json::from_value(json!({"status": true, "data": null})).unwrap();
        assert!(env.status);
        assert_eq!(env.data, None);
    }

    #[test]
    fn test_envelope_decodes_non_default_payload() {
        let missing: Envelope<TokenGrant> = serde_json::from_value(json!({"status": false})).unwrap();
        assert_eq!(missing.data, None);

        let null: Envelope<TokenGrant> =
            serde_json::from_value(json!({"status": true, "data": null})).unwrap();
        assert_eq!(null.into_success(), None);

        let grant: Envelope<TokenGrant> = serde_json::from_value(json!({
            "status": true,
            "data": {
                "access_token": "a-1",
                "token_type": "bearer",
                "refresh_token": "r-1",
                "expires_in": 3600
            }
        }))
        .unwrap();
        assert_eq!(grant.into_success().map(|g| g.access_token), Some("a-1".to_string()));
    }

    #[test]
    fn test_page_extract_reads_nested_fields() {
        let page = Page::extract(&json!({"data": [{"id": 1}], "from": 11, "total": 42})).unwrap();
        assert_eq!(page.data, vec![json!({"id": 1})]);
        assert_eq!(page.from, Some(11));
        assert_eq!(page.total, Some(42));
    }

    #[test]
    fn test_page_extract_missing_total_is_none() {
        let page = Page::extract(&json!({"data": [], "from": null})).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.from, None);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_page_extract_without_nested_data_is_none() {
        assert!(Page::extract(&json!([{"id": 1}])).is_none());
        assert!(Page::extract(&json!({"data": null})).is_none());
    }

    #[test]
    fn test_coerce_rows_wraps_scalars_and_objects() {
        assert_eq!(coerce_rows(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(coerce_rows(json!({"id": 3})), vec![json!({"id": 3})]);
    }

    #[test]
    fn test_token_grant_expires_at_ms() {
        let grant = TokenGrant {
            access_token: "a".into(),
            token_type: "bearer".into(),
            refresh_token: "r".into(),
            expires_in: 3600,
        };
        assert_eq!(grant.expires_at_ms(1_000), 3_601_000);
    }

    #[test]
    fn test_first_error_message_string() {
        assert_eq!(first_error_message(&json!("Email taken")), Some("Email taken".into()));
    }

    #[test]
    fn test_first_error_message_array() {
        assert_eq!(
            first_error_message(&json!(["first", "second"])),
            Some("first".into())
        );
        assert_eq!(first_error_message(&json!([])), None);
    }

    #[test]
    fn test_first_error_message_object_flattens_arrays() {
        let errors = json!({"email": ["The email is invalid.", "Too long."], "name": ["Required."]});
        assert_eq!(
            first_error_message(&errors),
            Some("The email is invalid.".into())
        );
    }

    #[test]
    fn test_first_error_message_object_with_string_values() {
        assert_eq!(
            first_error_message(&json!({"code": "Duplicate code."})),
            Some("Duplicate code.".into())
        );
    }

    #[test]
    fn test_first_error_message_empty_object_is_none() {
        assert_eq!(first_error_message(&json!({})), None);
        assert_eq!(first_error_message(&json!({"a": []})), None);
    }
}
