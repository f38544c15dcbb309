//! Session lifecycle: lazy token handshake, caching and invalidation.
//!
//! A session is the token + `GUID` cookie pair the daemon issues from
//! `token.html`. It is created on first use, reused until the daemon rejects it,
//! and never persisted.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::transport::{AuthHandshake, Transport};

/// Name of the daemon's session cookie.
pub const GUID_COOKIE: &str = "GUID";

/// What is known about a session's standing with the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionValidity {
    /// A request made with this session succeeded.
    Valid,
    /// The daemon rejected this session.
    Expired,
    /// Freshly issued, not yet used.
    Unknown,
}

/// Token and cookie proving the client is authenticated.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    cookie: String,
    validity: SessionValidity,
}

impl Session {
    /// Builds a session from a handshake result.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationUnavailable` when the handshake carried no `GUID`
    /// cookie or an empty token.
    pub fn from_handshake(handshake: AuthHandshake) -> Result<Self, ClientError> {
        let Some(guid) = handshake.guid.filter(|guid| !guid.is_empty()) else {
            return Err(ClientError::authentication_unavailable(
                "handshake response did not set a GUID cookie",
                None,
            ));
        };
        if handshake.token.is_empty() {
            return Err(ClientError::authentication_unavailable(
                "handshake response contained no token",
                None,
            ));
        }
        Ok(Self {
            token: handshake.token,
            cookie: format!("{GUID_COOKIE}={guid}"),
            validity: SessionValidity::Unknown,
        })
    }

    /// Value for the `token` query parameter.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Cookie` header.
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    #[must_use]
    pub fn validity(&self) -> SessionValidity {
        self.validity
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("cookie", &"<redacted>")
            .field("validity", &self.validity)
            .finish()
    }
}

/// Owns the client's single session.
///
/// Holds no retry policy; one call to [`SessionManager::current`] performs at
/// most one handshake.
#[derive(Debug, Default)]
pub struct SessionManager {
    session: Option<Session>,
    handshakes: u32,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached session, performing the handshake first if none is held.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationUnavailable` when the handshake fails at the
    /// transport level or yields no usable token/cookie.
    #[instrument(level = "debug", skip_all)]
    pub async fn current<T>(&mut self, transport: &T) -> Result<Session, ClientError>
    where
        T: Transport + ?Sized,
    {
        if let Some(session) = &self.session
            && session.validity != SessionValidity::Expired
        {
            return Ok(session.clone());
        }

        self.handshakes += 1;
        debug!(handshake = self.handshakes, "Requesting session token");
        let handshake = transport.authenticate().await.map_err(|e| {
            warn!(error = %e, "Token handshake failed");
            ClientError::authentication_unavailable(format!("token handshake failed: {e}"), Some(e))
        })?;

        let session = Session::from_handshake(handshake)?;
        info!(handshake = self.handshakes, "Session established");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Records that a request made with the current session succeeded.
    pub fn confirm(&mut self) {
        if let Some(session) = &mut self.session {
            session.validity = SessionValidity::Valid;
        }
    }

    /// Drops the cached session. The next [`SessionManager::current`] re-authenticates.
    pub fn invalidate(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.validity = SessionValidity::Expired;
            info!(validity = ?session.validity, "Session invalidated");
        }
    }

    /// The cached session, if any, without authenticating.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Handshakes attempted since construction.
    #[must_use]
    pub fn handshake_count(&self) -> u32 {
        self.handshakes
    }
}
