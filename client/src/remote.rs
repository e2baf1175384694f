use crate::config::MoviePilotConfig;
use crate::credential::{Credential, LoginResponse};
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Method, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

pub const LOGIN_PATH: &str = "/api/v1/login/access-token";

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_DETAIL_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(BTreeMap<String, String>),
}

/// One call against the MoviePilot REST api, relative to the configured base url.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

impl RemoteRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
        }
    }
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets (or replaces) a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, fields: BTreeMap<String, String>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return ResponseBody::Empty;
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl RemoteResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Short human readable error detail (FastAPI `detail`, `message`, or raw text).
    pub fn detail(&self) -> String {
        let detail = match &self.body {
            ResponseBody::Empty => String::new(),
            ResponseBody::Json(v) => v
                .get("detail")
                .or_else(|| v.get("message"))
                .map(|d| match d {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| v.to_string()),
            ResponseBody::Text(t) => t.clone(),
        };
        truncate(detail, MAX_DETAIL_LEN)
    }
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
        s.push_str("...");
    }
    s
}

/// Raw access to the MoviePilot server.
///
/// Implementations return every well-formed http response as is: status
/// interpretation belongs to the caller, and no retry happens here.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn call(
        &self,
        request: &RemoteRequest,
        credential: Option<&Credential>,
    ) -> Result<RemoteResponse, ClientError>;

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRemoteApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestRemoteApi {
    pub fn new(config: &MoviePilotConfig) -> Result<Self, ClientError> {
        let base_url = config.parsed_base_url()?;
        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("http client build error: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let relative = path.strip_prefix('/').ok_or_else(|| {
            ClientError::InvalidRequest(format!("path must be relative to base url: {path}"))
        })?;
        self.base_url
            .join(relative)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid path '{path}': {e}")))
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<RemoteResponse, ClientError> {
        let res = builder.send().await?;
        let status = res.status().as_u16();
        let bytes = res.bytes().await?;
        Ok(RemoteResponse {
            status,
            body: ResponseBody::from_bytes(&bytes),
        })
    }
}

#[async_trait]
impl RemoteApi for ReqwestRemoteApi {
    async fn call(
        &self,
        request: &RemoteRequest,
        credential: Option<&Credential>,
    ) -> Result<RemoteResponse, ClientError> {
        let url = self.url_for(&request.path)?;
        tracing::debug!("request: {} {} query: {:?}", request.method, url, request.query);

        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            Some(RequestBody::Json(v)) => builder.json(v),
            Some(RequestBody::Form(f)) => builder.form(f),
            None => builder,
        };
        if let Some(c) = credential {
            builder = builder.header(AUTHORIZATION, c.bearer());
        }
        let res = self.send(builder).await.inspect_err(|e| {
            tracing::warn!("network error on {} {}: {}", request.method, request.path, e);
        })?;
        tracing::debug!(
            "response: {} {} status={}",
            request.method,
            request.path,
            res.status
        );
        Ok(res)
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.url_for(LOGIN_PATH)?;
        tracing::info!("fetching access token from {}", url);
        let builder = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)]);
        let res = self.send(builder).await.inspect_err(|e| {
            tracing::error!("network error on login: {}", e);
        })?;
        if !res.is_success() {
            let message = format!("MoviePilot login failed: {} - {}", res.status, res.detail());
            tracing::error!("{}", message);
            return Err(ClientError::Auth {
                status: Some(res.status),
                message,
            });
        }
        match res.body {
            ResponseBody::Json(v) => serde_json::from_value::<LoginResponse>(v).map_err(|e| {
                ClientError::Auth {
                    status: Some(res.status),
                    message: format!("unexpected login response: {e}"),
                }
            }),
            _ => Err(ClientError::Auth {
                status: Some(res.status),
                message: "login response is not json".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder_unique_query_keys() {
        let req = RemoteRequest::get("/api/v1/media/search")
            .query("title", "Dune")
            .query("page", 1)
            .query("page", 2)
            .query_opt("year", None::<u32>);
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.query.get("page").map(String::as_str), Some("2"));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_response_body_from_bytes() {
        assert_eq!(ResponseBody::from_bytes(b""), ResponseBody::Empty);
        assert_eq!(ResponseBody::from_bytes(b"  \n"), ResponseBody::Empty);
        assert_eq!(
            ResponseBody::from_bytes(br#"{"a":1}"#),
            ResponseBody::Json(json!({"a": 1}))
        );
        assert_eq!(
            ResponseBody::from_bytes(b"Internal Server Error"),
            ResponseBody::Text("Internal Server Error".to_string())
        );
    }

    #[test]
    fn test_detail_extraction() {
        let res = RemoteResponse::json(400, json!({"detail": "bad token"}));
        assert_eq!(res.detail(), "bad token");
        let res = RemoteResponse::json(200, json!({"success": false, "message": "exists"}));
        assert_eq!(res.detail(), "exists");
        let res = RemoteResponse {
            status: 502,
            body: ResponseBody::Text("x".repeat(500)),
        };
        assert!(res.detail().len() <= MAX_DETAIL_LEN + 3);
        assert!(RemoteResponse::json(403, json!({})).is_auth_failure());
        assert!(!RemoteResponse::json(404, json!({})).is_auth_failure());
    }

    #[test]
    fn test_url_for_requires_leading_slash() {
        let config = MoviePilotConfig::new("http://localhost:3000/mp", "u", "p");
        let api = ReqwestRemoteApi::new(&config).unwrap();
        assert_eq!(
            api.url_for("/api/v1/subscribe/").unwrap().as_str(),
            "http://localhost:3000/mp/api/v1/subscribe/"
        );
        assert!(matches!(
            api.url_for("api/v1/subscribe/"),
            Err(ClientError::InvalidRequest(_))
        ));
    }
}
