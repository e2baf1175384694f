//! MoviePilot REST api access for the MCP bridge.
//!
//! - [`remote::RemoteApi`]: raw http calls (connection pooling, timeouts, body decoding)
//! - [`session::AuthSession`]: bearer token acquisition, caching and refresh-on-401/403
//!
//! ```ignore
//! use moviepilot_client::{AuthSession, MoviePilotConfig, RemoteRequest};
//!
//! let config = MoviePilotConfig::from_env()?;
//! let session = AuthSession::connect(&config)?;
//! let res = session
//!     .get_authenticated(RemoteRequest::get("/api/v1/user/current"))
//!     .await?;
//! ```

pub mod config;
pub mod credential;
pub mod error;
pub mod remote;
pub mod session;

pub use config::MoviePilotConfig;
pub use credential::{Credential, LoginResponse};
pub use error::{ClientError, TransportErrorKind};
pub use remote::{
    RemoteApi, RemoteRequest, RemoteResponse, RequestBody, ReqwestRemoteApi, ResponseBody,
};
pub use session::AuthSession;
