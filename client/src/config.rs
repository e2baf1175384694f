use crate::error::ClientError;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const MAX_AUTH_RETRIES: u32 = 3;

fn default_timeout_sec() -> u64 {
    30
}
fn default_auth_retries() -> u32 {
    1
}

/// Connection settings for the MoviePilot server.
///
/// Loaded from `MOVIEPILOT_*` environment variables:
/// - `MOVIEPILOT_BASE_URL`: server url, e.g. `http://localhost:3000` (required)
/// - `MOVIEPILOT_USERNAME` / `MOVIEPILOT_PASSWORD`: login credentials (required)
/// - `MOVIEPILOT_TIMEOUT_SEC`: per-request timeout (default: 30)
/// - `MOVIEPILOT_TOKEN_TTL_SEC`: assumed token lifetime when the login response has none
/// - `MOVIEPILOT_AUTH_RETRIES`: re-login attempts after an authorization failure (default: 1)
#[derive(Clone, Deserialize)]
pub struct MoviePilotConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    #[serde(default)]
    pub token_ttl_sec: Option<u64>,
    #[serde(default = "default_auth_retries")]
    pub auth_retries: u32,
}

// password must not end up in logs
impl std::fmt::Debug for MoviePilotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoviePilotConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"****")
            .field("timeout_sec", &self.timeout_sec)
            .field("token_ttl_sec", &self.token_ttl_sec)
            .field("auth_retries", &self.auth_retries)
            .finish()
    }
}

impl MoviePilotConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            timeout_sec: default_timeout_sec(),
            token_ttl_sec: None,
            auth_retries: default_auth_retries(),
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let config = envy::prefixed("MOVIEPILOT_")
            .from_env::<MoviePilotConfig>()
            .map_err(|e| ClientError::InvalidConfig(format!("MOVIEPILOT_* env: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        self.parsed_base_url()?;
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::InvalidConfig(
                "MOVIEPILOT_USERNAME and MOVIEPILOT_PASSWORD are required for auto login"
                    .to_string(),
            ));
        }
        if self.timeout_sec == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_sec must be greater than 0".to_string(),
            ));
        }
        if self.auth_retries > MAX_AUTH_RETRIES {
            return Err(ClientError::InvalidConfig(format!(
                "auth_retries must be at most {MAX_AUTH_RETRIES}, got {}",
                self.auth_retries
            )));
        }
        Ok(())
    }

    /// Base url normalized with a trailing slash so relative joins keep any sub path.
    pub fn parsed_base_url(&self) -> Result<Url, ClientError> {
        let raw = self.base_url.trim();
        let with_slash = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let url = Url::parse(&with_slash).map_err(|e| {
            ClientError::InvalidConfig(format!("cannot parse base url '{raw}': {e}"))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::InvalidConfig(format!(
                "unsupported url scheme '{other}' in base url"
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    pub fn token_ttl(&self) -> Option<Duration> {
        self.token_ttl_sec.map(Duration::from_secs)
    }
}
