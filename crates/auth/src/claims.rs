use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Claims as they appear on the wire inside a signed bearer token.
///
/// The subject is carried as `id` (the login endpoint's format); a `sub`
/// claim from standard tooling is used when `id` is absent. Subject and
/// role claims that are not strings decode as absent rather than failing
/// the whole token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Expiry (seconds since the Unix epoch).
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// First non-blank of `id`, then `sub`.
    pub fn subject(&self) -> Option<&str> {
        [self.id.as_deref(), self.sub.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Strings pass through, numbers keep their textual form, anything else
/// (arrays, objects, booleans, null) is treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Claims decoded from a verified token.
///
/// Lives only for the duration of the request that presented the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier; still unparsed at this stage.
    pub subject_id: String,

    /// Role claimed by the token, if any. Not validated against the closed
    /// role set until identity resolution.
    pub role: Option<String>,

    pub expires_at: DateTime<Utc>,
}
