//! Recording MoviePilot double shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use mcp_server::{Dispatcher, McpHandler, ToolCatalog};
use moviepilot_client::{
    AuthSession, ClientError, Credential, LoginResponse, MoviePilotConfig, RemoteApi,
    RemoteRequest, RemoteResponse,
};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves canned responses per (method, path); only the most recently issued
/// token is accepted. Unrouted paths answer 404.
#[derive(Default)]
pub struct FakeMoviePilot {
    routes: Mutex<HashMap<(Method, String), RemoteResponse>>,
    calls: Mutex<Vec<RemoteRequest>>,
    logins: AtomicUsize,
    valid_token: Mutex<Option<String>>,
    reject_all: AtomicBool,
    delay: Mutex<Duration>,
}

impl FakeMoviePilot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: Method, path: &str, response: RemoteResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    pub fn route_json(&self, method: Method, path: &str, body: Value) {
        self.route(method, path, RemoteResponse::json(200, body));
    }

    pub fn calls(&self) -> Vec<RemoteRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn expire_tokens(&self) {
        *self.valid_token.lock().unwrap() = Some("expired".to_string());
    }

    pub fn reject_all(&self) {
        self.reject_all.store(true, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl RemoteApi for FakeMoviePilot {
    async fn call(
        &self,
        request: &RemoteRequest,
        credential: Option<&Credential>,
    ) -> Result<RemoteResponse, ClientError> {
        self.calls.lock().unwrap().push(request.clone());
        let delay = *self.delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        tokio::task::yield_now().await;

        let accepted = self.valid_token.lock().unwrap().clone();
        if self.reject_all.load(Ordering::SeqCst)
            || credential.map(|c| c.token().to_string()) != accepted
        {
            return Ok(RemoteResponse::json(
                401,
                json!({"detail": "Could not validate credentials"}),
            ));
        }
        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method.clone(), request.path.clone()))
            .cloned();
        Ok(route.unwrap_or_else(|| RemoteResponse::json(404, json!({"detail": "Not Found"}))))
    }

    async fn login(&self, username: &str, _password: &str) -> Result<LoginResponse, ClientError> {
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{n}");
        *self.valid_token.lock().unwrap() = Some(token.clone());
        Ok(LoginResponse {
            access_token: Some(token),
            token_type: Some("bearer".to_string()),
            expires_in: None,
            user_name: Some(username.to_string()),
        })
    }
}

pub fn moviepilot_config() -> MoviePilotConfig {
    MoviePilotConfig::new("http://moviepilot.test", "admin", "secret")
}

pub fn dispatcher(fake: &Arc<FakeMoviePilot>, timeout: Duration) -> Dispatcher {
    let session = Arc::new(AuthSession::new(fake.clone(), &moviepilot_config()));
    let catalog = Arc::new(ToolCatalog::moviepilot().unwrap());
    Dispatcher::new(catalog, session, timeout)
}

pub fn handler(fake: &Arc<FakeMoviePilot>) -> McpHandler {
    McpHandler::new(dispatcher(fake, Duration::from_secs(5)))
}

pub fn args(value: Value) -> Option<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
