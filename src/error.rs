//! Top-level error taxonomy for client operations.

use std::fmt;

use thiserror::Error;

use crate::magnet::MagnetError;
use crate::message::DecodeError;
use crate::transport::{HttpStatusKind, TransportError};

/// Flat category of a [`ClientError`], for callers that branch without
/// matching nested sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthenticationUnavailable,
    AuthenticationFailed,
    ServerResponseInvalid,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    ClientRequestError,
    Network,
    NotFoundWithinDeadline,
    Decode,
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AuthenticationUnavailable => "authentication_unavailable",
            Self::AuthenticationFailed => "authentication_failed",
            Self::ServerResponseInvalid => "server_response_invalid",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::NotAcceptable => "not_acceptable",
            Self::ClientRequestError => "client_request_error",
            Self::Network => "network",
            Self::NotFoundWithinDeadline => "not_found_within_deadline",
            Self::Decode => "decode",
            Self::InvalidInput => "invalid_input",
        };
        f.write_str(label)
    }
}

/// Errors surfaced by [`crate::UTorrentClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The token handshake failed or returned no usable session.
    #[error("authentication unavailable: {reason}")]
    AuthenticationUnavailable {
        /// What went wrong.
        reason: String,
        /// Transport failure behind the handshake, if any.
        #[source]
        source: Option<TransportError>,
    },

    /// The daemon rejected a freshly obtained session as well.
    #[error("authentication failed: daemon rejected the refreshed session")]
    AuthenticationFailed {
        /// The second rejection.
        #[source]
        source: TransportError,
    },

    /// The daemon answered with an empty body.
    #[error("daemon returned an empty response for {request}")]
    ServerResponseInvalid {
        /// Label of the request (action name or `list`).
        request: String,
    },

    /// Any other transport failure, passed through unchanged.
    #[error(transparent)]
    Request(#[from] TransportError),

    /// The torrent did not appear within the poll budget.
    #[error("torrent {hash} not found after {attempts} attempts")]
    NotFoundWithinDeadline {
        /// Hash that was polled for.
        hash: String,
        /// List requests made.
        attempts: u32,
    },

    /// A payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A magnet link could not be parsed or built.
    #[error(transparent)]
    Magnet(#[from] MagnetError),
}

impl ClientError {
    /// Creates an `AuthenticationUnavailable` error.
    pub fn authentication_unavailable(
        reason: impl Into<String>,
        source: Option<TransportError>,
    ) -> Self {
        Self::AuthenticationUnavailable {
            reason: reason.into(),
            source,
        }
    }

    /// Creates a `ServerResponseInvalid` error.
    pub fn server_response_invalid(request: impl Into<String>) -> Self {
        Self::ServerResponseInvalid {
            request: request.into(),
        }
    }

    /// Returns the flat category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationUnavailable { .. } => ErrorKind::AuthenticationUnavailable,
            Self::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            Self::ServerResponseInvalid { .. } => ErrorKind::ServerResponseInvalid,
            Self::Request(err) => match err.status_kind() {
                Some(HttpStatusKind::BadRequest) => ErrorKind::BadRequest,
                Some(HttpStatusKind::Unauthorized) => ErrorKind::Unauthorized,
                Some(HttpStatusKind::Forbidden) => ErrorKind::Forbidden,
                Some(HttpStatusKind::NotFound) => ErrorKind::NotFound,
                Some(HttpStatusKind::NotAcceptable) => ErrorKind::NotAcceptable,
                Some(HttpStatusKind::Other) => ErrorKind::ClientRequestError,
                None => ErrorKind::Network,
            },
            Self::NotFoundWithinDeadline { .. } => ErrorKind::NotFoundWithinDeadline,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Magnet(_) => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_transport_status() {
        let err = ClientError::from(TransportError::status("http://h/gui/", 403, "Forbidden"));
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let source = TransportError::status("http://h/gui/", 500, "Internal Server Error");
        let err = ClientError::from(source);
        assert_eq!(err.kind(), ErrorKind::ClientRequestError);

        let err = ClientError::from(TransportError::Timeout {
            url: "http://h/gui/".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ClientError::NotFoundWithinDeadline {
            hash: "AAAA".to_string(),
            attempts: 4,
        };
        assert_eq!(err.to_string(), "torrent AAAA not found after 4 attempts");
        assert_eq!(err.kind().to_string(), "not_found_within_deadline");

        let err = ClientError::server_response_invalid("getsettings");
        assert!(err.to_string().contains("getsettings"));
    }

    #[test]
    fn test_magnet_errors_are_invalid_input() {
        let err = ClientError::from(MagnetError::MissingHash);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.kind().to_string(), "invalid_input");
    }
}
