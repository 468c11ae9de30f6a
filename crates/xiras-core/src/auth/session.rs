use std::fmt;

use chrono::{DateTime, Utc};

use super::Credentials;

/// Record key for the profile and course endpoints.
///
/// Derived once from the identifier that authenticated, so later requests
/// never re-read the login form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self(credentials.identifier().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated session. Lives only in memory.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    account_key: AccountKey,
    authenticated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: String, account_key: AccountKey) -> Self {
        Self {
            access_token,
            account_key,
            authenticated_at: Utc::now(),
        }
    }

    /// Bearer token for authenticated requests
    pub fn token(&self) -> &str {
        &self.access_token
    }

    pub fn account_key(&self) -> &AccountKey {
        &self.account_key
    }

    /// Minutes since login (for display)
    pub fn minutes_since_login(&self) -> i64 {
        (Utc::now() - self.authenticated_at).num_minutes()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("account_key", &self.account_key)
            .field("authenticated_at", &self.authenticated_at)
            .finish()
    }
}
