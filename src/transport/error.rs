//! Error types for the transport layer.
//!
//! Every HTTP status >= 300 becomes a [`TransportError::Status`] tagged with an
//! [`HttpStatusKind`], so callers above the transport can branch on the category
//! without re-parsing status codes.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Category of a non-success HTTP status returned by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatusKind {
    /// 400. The daemon answers a stale or unknown token with this status.
    BadRequest,
    /// 401. Basic-auth credentials missing or wrong.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 406.
    NotAcceptable,
    /// Any other status >= 300.
    Other,
}

impl HttpStatusKind {
    /// Maps a status code to its category.
    #[must_use]
    pub fn from_code(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            406 => Self::NotAcceptable,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for HttpStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::NotAcceptable => "not_acceptable",
            Self::Other => "client_request_error",
        };
        write!(f, "{label}")
    }
}

/// Errors raised while executing a single HTTP request against the daemon.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The daemon answered with a status >= 300.
    #[error("HTTP {status} {reason} from {url}")]
    Status {
        /// Request URL without the query string.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Category derived from `status`.
        kind: HttpStatusKind,
    },

    /// Network-level failure (DNS, connection refused, TLS, body read).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// Request URL without the query string.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Request did not complete within the configured timeout.
    #[error("timeout requesting {url}")]
    Timeout {
        /// Request URL without the query string.
        url: String,
    },

    /// The server URI could not be built or joined.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
    },

    /// A file attachment could not be read.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path of the attachment.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Connection parameters are invalid.
    #[error("invalid connection parameters: {0}")]
    Config(#[from] ConfigError),

    /// The underlying HTTP client could not be constructed.
    #[error("{reason}")]
    ClientBuild {
        /// What went wrong.
        reason: String,
    },
}

impl TransportError {
    /// Creates a status error, deriving the category from the code.
    pub fn status(url: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::Status {
            url: url.into(),
            status,
            reason: reason.into(),
            kind: HttpStatusKind::from_code(status),
        }
    }

    /// Creates a network error, or a timeout error when reqwest reports one.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error for a file attachment.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Status category, if this is a status error.
    #[must_use]
    pub fn status_kind(&self) -> Option<HttpStatusKind> {
        match self {
            Self::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Status code, if this is a status error.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the daemon rejected the session token (HTTP 400 in this protocol).
    #[must_use]
    pub fn is_session_rejected(&self) -> bool {
        self.status_kind() == Some(HttpStatusKind::BadRequest)
    }
}
