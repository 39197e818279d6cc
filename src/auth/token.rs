use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// Treat tokens this close to expiry as already expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth2 bearer token as cached on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Body of a token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

impl OAuthToken {
    /// Builds a token from an endpoint response. Refresh responses usually omit
    /// the refresh token, in which case `previous_refresh` is kept.
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response.refresh_token.or(previous_refresh),
            expiry: response
                .expires_in
                .map(|secs| now + Duration::seconds(secs)),
            scope: response.scope,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(EXPIRY_MARGIN_SECS) >= expiry,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Tokens saved without a scope are assumed to cover whatever they were issued for.
    pub fn covers_scope(&self, required: &str) -> bool {
        match &self.scope {
            Some(granted) => granted.split_whitespace().any(|s| s == required),
            None => true,
        }
    }
}
