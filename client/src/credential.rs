use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Refresh slightly ahead of the asserted expiry so in-flight requests do not race it.
/// Capped at half the token lifetime.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Body of `POST /api/v1/login/access-token`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Bearer token obtained from the MoviePilot login endpoint.
#[derive(Clone)]
pub struct Credential {
    token: String,
    obtained_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"****")
            .field("obtained_at", &self.obtained_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            obtained_at: Utc::now(),
            expires_at,
        }
    }

    /// `expires_in` asserted by the server wins over the configured ttl.
    pub fn from_login(
        token: String,
        expires_in: Option<u64>,
        fallback_ttl: Option<Duration>,
    ) -> Self {
        let obtained_at = Utc::now();
        let lifetime = expires_in
            .map(Duration::from_secs)
            .or(fallback_ttl)
            .and_then(|d| ChronoDuration::from_std(d).ok());
        Self {
            token,
            obtained_at,
            expires_at: lifetime.map(|l| obtained_at + l),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let half_life = (expires_at - self.obtained_at) / 2;
                let margin = ChronoDuration::seconds(EXPIRY_MARGIN_SECS)
                    .min(half_life)
                    .max(ChronoDuration::zero());
                now + margin >= expires_at
            }
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
