use serde::Deserialize;

use crate::config::EnvelopePolarity;

/// Body of a successful `/api/token/` response.
///
/// Only the first entry's token is ever used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub data: Vec<TokenEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    #[serde(default)]
    pub access_token: Option<String>,
}

impl TokenResponse {
    /// The first entry's access token, if the list is non-empty and it has one.
    pub fn first_token(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|entry| entry.access_token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// `{success, data}` wrapper used by the profile and course endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Missing or `null` reads as `false`.
    #[serde(default, deserialize_with = "falsy_flag")]
    pub success: bool,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The payload, if the envelope's flag is accepted under `polarity`.
    pub fn accepted(self, polarity: EnvelopePolarity) -> Option<T> {
        if polarity.accepts(self.success) {
            self.data
        } else {
            None
        }
    }
}

fn falsy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}
