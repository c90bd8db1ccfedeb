use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Claims of a verified access token.
///
/// NOTE:
/// - Decoding never fails on the shape of an optional claim. A token that
///   verified is not turned away because an issuer writes `scp` as a string
///   or `iat` as a fraction.
/// - `aud`, `scope` and `scp` can be a string or an array, so they stay a `Value`.
/// - NumericDates are truncated to whole seconds.
/// - Claims the server does not interpret are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub aud: Value,

    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,
    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub nbf: Option<i64>,
    #[serde(
        default,
        deserialize_with = "numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub jti: Option<String>,

    // Space separated string or an array, under either name
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub scope: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub scp: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Strings as is, numbers in their JSON form, anything else dropped.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    })
}

fn string_list(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => s.split_whitespace().collect(),
        Value::Array(values) => values.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

impl Claims {
    pub fn audiences(&self) -> Vec<&str> {
        match &self.aud {
            Value::String(s) => vec![s.as_str()],
            Value::Array(values) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `scope` wins over `scp` when both are present.
    pub fn scopes(&self) -> Vec<&str> {
        if self.scope.is_null() {
            string_list(&self.scp)
        } else {
            string_list(&self.scope)
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().contains(&scope)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp?, 0)
    }

    /// Any claim by name, registered or not.
    pub fn get(&self, name: &str) -> Option<Value> {
        let present = |v: &Value| (!v.is_null()).then(|| v.clone());
        match name {
            "sub" => self.sub.clone().map(Value::String),
            "iss" => self.iss.clone().map(Value::String),
            "aud" => present(&self.aud),
            "exp" => self.exp.map(Value::from),
            "nbf" => self.nbf.map(Value::from),
            "iat" => self.iat.map(Value::from),
            "jti" => self.jti.clone().map(Value::String),
            "scope" => present(&self.scope),
            "scp" => present(&self.scp),
            _ => self.extra.get(name).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn audience_accepts_string_and_array() {
        assert_eq!(claims(json!({"aud": "orders"})).audiences(), vec!["orders"]);
        assert_eq!(
            claims(json!({"aud": ["orders", "billing"]})).audiences(),
            vec!["orders", "billing"]
        );
        assert!(claims(json!({})).audiences().is_empty());
    }

    #[test]
    fn scopes_from_scope_or_scp() {
        let c = claims(json!({"scope": "orders:read orders:write"}));
        assert_eq!(c.scopes(), vec!["orders:read", "orders:write"]);
        assert!(c.has_scope("orders:write"));

        let c = claims(json!({"scp": ["profile"]}));
        assert_eq!(c.scopes(), vec!["profile"]);
        assert!(!c.has_scope("orders:read"));
    }

    #[test]
    fn scopes_accept_either_shape_under_either_name() {
        let c = claims(json!({"scp": "User.Read Mail.Send"}));
        assert_eq!(c.scopes(), vec!["User.Read", "Mail.Send"]);

        let c = claims(json!({"scope": ["orders:read", 7, "orders:write"]}));
        assert_eq!(c.scopes(), vec!["orders:read", "orders:write"]);

        assert!(claims(json!({"scope": {"nested": true}})).scopes().is_empty());
    }

    #[test]
    fn numeric_subject_and_id_are_kept_as_text() {
        let c = claims(json!({"sub": 12345, "jti": 9, "iss": "https://idp.test"}));
        assert_eq!(c.sub.as_deref(), Some("12345"));
        assert_eq!(c.jti.as_deref(), Some("9"));

        let c = claims(json!({"sub": {"id": 1}}));
        assert!(c.sub.is_none());
    }

    #[test]
    fn fractional_numeric_dates_are_truncated() {
        let c = claims(json!({"exp": 1_700_000_000.75, "iat": 1_699_999_000.5, "nbf": "soon"}));
        assert_eq!(c.exp, Some(1_700_000_000));
        assert_eq!(c.iat, Some(1_699_999_000));
        assert_eq!(c.nbf, None);
    }

    #[test]
    fn unknown_claims_are_kept() {
        let c = claims(json!({"sub": "u-1", "tenant": "acme"}));
        assert_eq!(c.get("tenant"), Some(json!("acme")));
        assert_eq!(c.get("sub"), Some(json!("u-1")));
        assert_eq!(c.get("missing"), None);
    }

    #[test]
    fn expiry_as_datetime() {
        let c = claims(json!({"exp": 1_700_000_000u64}));
        assert_eq!(c.expires_at().unwrap().timestamp(), 1_700_000_000);
        assert!(claims(json!({})).expires_at().is_none());
    }
}
