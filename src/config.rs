//! Connection parameters for one daemon.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Default HTTP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Path of the WebUI below the server root.
pub const GUI_PATH: &str = "/gui/";

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Invalid connection parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported scheme '{0}': expected http or https")]
    UnsupportedScheme(String),

    #[error("host must not be empty")]
    EmptyHost,

    #[error("port must be in 1..=65535")]
    InvalidPort,

    #[error("{field} must be in 1..={MAX_TIMEOUT_SECS} seconds, got {value}")]
    InvalidTimeout { field: &'static str, value: u64 },

    #[error("cannot build server URI from {0}")]
    InvalidUri(String),
}

/// Basic-auth credentials for the WebUI.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and how to reach the daemon.
///
/// # Example
///
/// ```
/// use utorrent_webapi::ConnectionParams;
///
/// let params = ConnectionParams::new("localhost", 8080)
///     .with_credentials("admin", "secret")
///     .with_read_timeout_secs(15);
/// assert_eq!(params.server_uri().unwrap().as_str(), "http://localhost:8080/gui/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    scheme: String,
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
}

impl ConnectionParams {
    /// Plain-HTTP parameters with default timeouts and no credentials.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
            credentials: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_read_timeout_secs(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn connect_timeout_secs(&self) -> u64 {
        self.connect_timeout_secs
    }

    #[must_use]
    pub fn read_timeout_secs(&self) -> u64 {
        self.read_timeout_secs
    }

    /// Checks scheme, host, port and timeout ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.scheme.clone()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        validate_timeout("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }

    /// Base URI of the WebUI: `{scheme}://{host}:{port}/gui/`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails or the URI does not parse.
    pub fn server_uri(&self) -> Result<Url, ConfigError> {
        self.validate()?;
        let raw = format!("{}://{}:{}{GUI_PATH}", self.scheme, self.host, self.port);
        Url::parse(&raw).map_err(|_| ConfigError::InvalidUri(raw))
    }
}

fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
        return Err(ConfigError::InvalidTimeout { field, value });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_uri_includes_gui_path() {
        let params = ConnectionParams::new("host.com", 8080);
        assert_eq!(
            params.server_uri().unwrap().as_str(),
            "http://host.com:8080/gui/"
        );

        let tls = ConnectionParams::new("host.com", 443).with_scheme("https");
        assert_eq!(tls.server_uri().unwrap().as_str(), "https://host.com/gui/");
    }

    #[test]
    fn test_defaults() {
        let params = ConnectionParams::new("localhost", 8080);
        assert_eq!(params.scheme(), "http");
        assert_eq!(params.connect_timeout_secs(), DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(params.read_timeout_secs(), DEFAULT_READ_TIMEOUT_SECS);
        assert!(params.credentials().is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            ConnectionParams::new("h", 1).with_scheme("ftp").validate(),
            Err(ConfigError::UnsupportedScheme("ftp".to_string()))
        );
        assert_eq!(
            ConnectionParams::new(" ", 1).validate(),
            Err(ConfigError::EmptyHost)
        );
        assert_eq!(
            ConnectionParams::new("h", 0).validate(),
            Err(ConfigError::InvalidPort)
        );
        let zero_timeout = ConnectionParams::new("h", 1).with_read_timeout_secs(0);
        assert_eq!(
            zero_timeout.validate(),
            Err(ConfigError::InvalidTimeout {
                field: "read_timeout_secs",
                value: 0
            })
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let params = ConnectionParams::new("h", 1).with_credentials("admin", "hunter2");
        let rendered = format!("{params:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
    }
}
