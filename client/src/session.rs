//! Bearer token lifecycle for MoviePilot calls.
//!
//! The cached [`Credential`] lives inside [`AuthSession`]. Acquisition is
//! serialized by `refresh_lock`: a task that observes a stale token takes the
//! lock, then reuses whatever another task committed while it waited instead
//! of logging in again. A rejected token is dropped before the refresh starts;
//! the cell is written only after a login completes, so a failed or cancelled
//! refresh leaves it empty rather than holding a known-bad token.

use crate::config::MoviePilotConfig;
use crate::credential::Credential;
use crate::error::ClientError;
use crate::remote::{RemoteApi, RemoteRequest, RemoteResponse, ReqwestRemoteApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

pub struct AuthSession {
    remote: Arc<dyn RemoteApi>,
    username: String,
    password: String,
    token_ttl: Option<Duration>,
    auth_retries: u32,
    credential: RwLock<Option<Arc<Credential>>>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("username", &self.username)
            .field("token_ttl", &self.token_ttl)
            .field("auth_retries", &self.auth_retries)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    pub fn new(remote: Arc<dyn RemoteApi>, config: &MoviePilotConfig) -> Self {
        Self {
            remote,
            username: config.username.clone(),
            password: config.password.clone(),
            token_ttl: config.token_ttl(),
            auth_retries: config.auth_retries,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Session backed by the reqwest client, for a validated config.
    pub fn connect(config: &MoviePilotConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let remote = ReqwestRemoteApi::new(config)?;
        Ok(Self::new(Arc::new(remote), config))
    }

    /// Sends `request` with the cached bearer token, logging in first when
    /// needed and re-logging in after an authorization failure.
    pub async fn get_authenticated(
        &self,
        request: RemoteRequest,
    ) -> Result<RemoteResponse, ClientError> {
        let mut credential = self.acquire(None).await?;
        let mut attempt = 0;
        loop {
            let res = self.remote.call(&request, Some(credential.as_ref())).await?;
            if !res.is_auth_failure() {
                return Ok(res);
            }
            if attempt >= self.auth_retries {
                self.discard(&credential).await;
                tracing::error!(
                    "authorization still rejected ({}) for {} {} after {} refresh(es)",
                    res.status,
                    request.method,
                    request.path,
                    attempt
                );
                return Err(ClientError::Auth {
                    status: Some(res.status),
                    message: format!(
                        "authorization failed or token expired: {} - {}",
                        res.status,
                        res.detail()
                    ),
                });
            }
            attempt += 1;
            tracing::info!(
                "authorization rejected ({}) for {} {}, refreshing token",
                res.status,
                request.method,
                request.path
            );
            self.discard(&credential).await;
            credential = self.acquire(Some(&credential)).await?;
        }
    }

    /// Returns a usable credential. `stale` is the one the caller saw rejected:
    /// it is never handed back, but a newer one from a concurrent refresh is.
    async fn acquire(&self, stale: Option<&Arc<Credential>>) -> Result<Arc<Credential>, ClientError> {
        let seen = self.credential.read().await.clone();
        if let Some(c) = seen.as_ref().filter(|c| !c.is_expired() && !is_same(stale, c)) {
            return Ok(c.clone());
        }
        let _guard = self.refresh_lock.lock().await;
        // anything committed while waiting is fresh, whatever its lifetime
        let current = self.credential.read().await.clone();
        if let Some(c) = current.filter(|c| !is_same(seen.as_ref(), c) && !is_same(stale, c)) {
            tracing::debug!("reusing token refreshed by a concurrent call");
            return Ok(c);
        }
        let fresh = Arc::new(self.login().await?);
        *self.credential.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    async fn login(&self) -> Result<Credential, ClientError> {
        tracing::info!("no valid token, logging in to MoviePilot as {}", self.username);
        let res = self.remote.login(&self.username, &self.password).await?;
        let token = res
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Auth {
                status: None,
                message: "login succeeded but no access token was returned".to_string(),
            })?;
        tracing::info!("login successful, token obtained");
        Ok(Credential::from_login(token, res.expires_in, self.token_ttl))
    }

    // only clears the cell if nobody replaced it meanwhile
    async fn discard(&self, credential: &Arc<Credential>) {
        let mut cell = self.credential.write().await;
        if cell.as_ref().is_some_and(|c| Arc::ptr_eq(c, credential)) {
            *cell = None;
        }
    }

    /// Drops the cached credential; the next call logs in again.
    pub async fn invalidate(&self) {
        *self.credential.write().await = None;
    }

    pub async fn has_credential(&self) -> bool {
        self.credential.read().await.is_some()
    }
}

fn is_same(known: Option<&Arc<Credential>>, current: &Arc<Credential>) -> bool {
    known.is_some_and(|k| Arc::ptr_eq(k, current))
}
