use std::fmt;
use thiserror::Error;

/// Network-level failure category for a MoviePilot call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Decode,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Decode => "decode",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("TransportError({kind}: {message})")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },
    #[error("AuthError({message})")]
    Auth {
        status: Option<u16>,
        message: String,
    },
    #[error("InvalidConfig({0})")]
    InvalidConfig(String),
    #[error("InvalidRequest({0})")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn timeout(message: impl Into<String>) -> Self {
        ClientError::Transport {
            kind: TransportErrorKind::Timeout,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else if e.is_decode() || e.is_body() {
            TransportErrorKind::Decode
        } else {
            TransportErrorKind::Request
        };
        // strip the url: it may carry query parameters the caller did not expect to see echoed
        ClientError::Transport {
            kind,
            message: e.without_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_names() {
        assert_eq!(TransportErrorKind::Timeout.as_str(), "timeout");
        assert_eq!(TransportErrorKind::Connect.to_string(), "connect");
        let e = ClientError::timeout("deadline exceeded");
        assert_eq!(e.to_string(), "TransportError(timeout: deadline exceeded)");
    }
}
