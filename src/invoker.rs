//! Authenticated request execution with a single stale-session retry.

use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::session::SessionManager;
use crate::transport::{ApiRequest, HttpMethod, Transport};

/// Attempts per logical request: the original plus one retry after a 400.
pub const MAX_ATTEMPTS: u32 = 2;

/// Attaches session credentials to requests and recovers from one rejected session.
#[derive(Debug, Default)]
pub struct AuthenticatedInvoker {
    sessions: SessionManager,
}

impl AuthenticatedInvoker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Executes `request` with the current session and returns the response body.
    ///
    /// A 400 from the daemon invalidates the session. The first one triggers a
    /// retry with a fresh session; a second one is terminal.
    ///
    /// # Errors
    ///
    /// - `AuthenticationUnavailable` if a handshake fails
    /// - `AuthenticationFailed` if the refreshed session is rejected too
    /// - `ServerResponseInvalid` if the daemon answers with an empty body
    /// - `Request` for every other transport failure, unchanged
    #[instrument(level = "debug", skip_all, fields(request = %request.label(), method = ?method))]
    pub async fn invoke<T>(
        &mut self,
        transport: &T,
        request: &ApiRequest,
        method: HttpMethod,
    ) -> Result<String, ClientError>
    where
        T: Transport + ?Sized,
    {
        let mut attempt = 1;
        loop {
            let session = self.sessions.current(transport).await?;
            let authenticated = request.authenticated(session.token(), session.cookie());

            match transport.execute(method, &authenticated).await {
                Ok(body) => {
                    self.sessions.confirm();
                    if body.trim().is_empty() {
                        return Err(ClientError::server_response_invalid(request.label()));
                    }
                    debug!(attempt, bytes = body.len(), "Request succeeded");
                    return Ok(body);
                }
                Err(e) if e.is_session_rejected() => {
                    self.sessions.invalidate();
                    if attempt >= MAX_ATTEMPTS {
                        warn!(attempt, "Refreshed session rejected, giving up");
                        return Err(ClientError::AuthenticationFailed { source: e });
                    }
                    debug!(attempt, "Session rejected, retrying with a fresh session");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
