//! Transport executor for the daemon's HTTP control API.
//!
//! The [`Transport`] trait is the seam between the stateful client core and the
//! network. It sends exactly one request per call and reports non-success statuses
//! as categorized [`TransportError`]s; it never retries and holds no session state.
//!
//! - [`HttpTransport`] - reqwest-backed implementation used in production
//! - [`ApiRequest`] - per-call request descriptor (query params, headers, file parts)
//! - [`AuthHandshake`] - raw result of the `token.html` handshake

mod error;
mod http;
mod request;

pub use error::{HttpStatusKind, TransportError};
pub use http::{HttpTransport, TOKEN_PATH, extract_guid, strip_markup};
pub use request::{ApiRequest, COOKIE_HEADER, FilePart, QueryParam};

use async_trait::async_trait;

/// HTTP verb used to execute a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// All parameters in the URL query string.
    Get,
    /// Parameters in the query string, file parts as multipart form data.
    Post,
}

/// Raw outcome of the authentication handshake.
///
/// `guid` is `None` when the daemon did not set a `GUID` cookie; the session
/// manager treats that as an unusable handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHandshake {
    /// Token with markup already stripped.
    pub token: String,
    /// Value of the `GUID` cookie attribute.
    pub guid: Option<String>,
}

impl std::fmt::Debug for AuthHandshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHandshake")
            .field("token_len", &self.token.len())
            .field("has_guid", &self.guid.is_some())
            .finish()
    }
}

/// Executes single HTTP requests against one daemon.
///
/// Implementations must be stateless per call so one instance can be shared.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET with every parameter in the query string.
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportError>;

    /// Sends a POST with file parts as multipart form data.
    async fn post(&self, request: &ApiRequest) -> Result<String, TransportError>;

    /// Performs the token handshake.
    async fn authenticate(&self) -> Result<AuthHandshake, TransportError>;

    /// Dispatches on `method`.
    async fn execute(
        &self,
        method: HttpMethod,
        request: &ApiRequest,
    ) -> Result<String, TransportError> {
        match method {
            HttpMethod::Get => self.get(request).await,
            HttpMethod::Post => self.post(request).await,
        }
    }
}
