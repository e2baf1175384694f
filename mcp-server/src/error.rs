use moviepilot_client::{ClientError, TransportErrorKind};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Failure of a single tool invocation, as reported to the MCP caller.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),
    #[error("invalid arguments: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
    #[error("schema mismatch: {0}")]
    Schema(String),
    #[error("transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("MoviePilot error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error("tool call cancelled")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Stable machine readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "not_found",
            ToolError::Validation { .. } => "validation_error",
            ToolError::Schema(_) => "schema_error",
            ToolError::Transport { .. } => "transport_error",
            ToolError::Auth(_) => "auth_error",
            ToolError::Upstream { .. } => "upstream_error",
            ToolError::Cancelled => "cancelled",
            ToolError::Internal(_) => "internal_error",
        }
    }

    /// `{"error": {"kind": .., "message": .., ..}}`
    pub fn to_payload(&self) -> Value {
        let mut error = Map::new();
        error.insert("kind".to_string(), json!(self.kind()));
        error.insert("message".to_string(), json!(self.to_string()));
        match self {
            ToolError::NotFound(name) => {
                error.insert("tool".to_string(), json!(name));
            }
            ToolError::Validation {
                field: Some(field), ..
            } => {
                error.insert("field".to_string(), json!(field));
            }
            ToolError::Transport { kind, .. } => {
                error.insert("transport_kind".to_string(), json!(kind.as_str()));
            }
            ToolError::Upstream {
                status: Some(status),
                ..
            } => {
                error.insert("status".to_string(), json!(status));
            }
            _ => {}
        }
        json!({ "error": error })
    }
}

impl From<ClientError> for ToolError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Transport { kind, message } => ToolError::Transport { kind, message },
            ClientError::Auth { message, .. } => ToolError::Auth(message),
            ClientError::InvalidConfig(m) | ClientError::InvalidRequest(m) => {
                ToolError::Internal(m)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes() {
        let e = ToolError::validation("title", "\"title\" is a required property");
        assert_eq!(
            e.to_payload(),
            json!({"error": {
                "kind": "validation_error",
                "message": "invalid arguments: \"title\" is a required property",
                "field": "title"
            }})
        );

        let e = ToolError::Transport {
            kind: TransportErrorKind::Timeout,
            message: "operation timed out".to_string(),
        };
        let payload = e.to_payload();
        assert_eq!(payload["error"]["kind"], "transport_error");
        assert_eq!(payload["error"]["transport_kind"], "timeout");

        let e = ToolError::Upstream {
            status: Some(500),
            message: "boom".to_string(),
        };
        assert_eq!(e.to_payload()["error"]["status"], 500);
        assert_eq!(ToolError::NotFound("x".into()).to_payload()["error"]["tool"], "x");
    }

    #[test]
    fn test_from_client_error() {
        let e: ToolError = ClientError::Auth {
            status: Some(401),
            message: "expired".to_string(),
        }
        .into();
        assert_eq!(e.kind(), "auth_error");
        let e: ToolError = ClientError::InvalidRequest("bad path".to_string()).into();
        assert_eq!(e.kind(), "internal_error");
    }
}
