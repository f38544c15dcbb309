//! reqwest-backed [`Transport`] for the WebUI.
//!
//! Client construction follows one policy for every request: connect and read
//! timeouts from [`ConnectionParams`], a fixed User-Agent, gzip, and HTTP basic
//! auth when credentials are configured. Session cookies are attached explicitly
//! by the invoker, so no cookie store is enabled here.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::SET_COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder, Response};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ApiRequest, AuthHandshake, Transport, TransportError};
use crate::config::{ConnectionParams, Credentials};
use crate::session::GUID_COOKIE;
use crate::user_agent;

/// Handshake page below the WebUI base path.
pub const TOKEN_PATH: &str = "token.html";

#[allow(clippy::expect_used)] // Static pattern, safe to panic
static MARKUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup regex is valid"));

/// Removes every `<...>` tag and trims surrounding whitespace.
///
/// `token.html` wraps the token as `<html><div id='token'>TOKEN</div></html>`.
#[must_use]
pub fn strip_markup(body: &str) -> String {
    MARKUP_PATTERN.replace_all(body, "").trim().to_string()
}

/// Extracts the `GUID` attribute value from one `Set-Cookie` header value.
#[must_use]
pub fn extract_guid(set_cookie: &str) -> Option<String> {
    set_cookie
        .split([';', ','])
        .filter_map(|element| element.trim().split_once('='))
        .find(|(name, _)| name.trim() == GUID_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// HTTP transport bound to one daemon's `/gui/` endpoint.
///
/// Cheap to clone; clones share the reqwest connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Builds the transport from connection parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] for invalid parameters and
    /// [`TransportError::ClientBuild`] when the reqwest client cannot be built.
    #[instrument(level = "debug", skip_all, fields(host = %params.host(), port = params.port()))]
    pub fn new(params: &ConnectionParams) -> Result<Self, TransportError> {
        let base_url = params.server_uri()?;
        let timeouts = (
            Duration::from_secs(params.connect_timeout_secs()),
            Duration::from_secs(params.read_timeout_secs()),
        );

        let client = match try_build_client(timeouts, false) {
            Ok(client) => client,
            Err(BuildClientFailure::Panic) => {
                // Some sandboxed environments panic when querying system proxy
                // settings; retry with env-only proxy lookup.
                warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
                try_build_client(timeouts, true).map_err(BuildClientFailure::into_transport_error)?
            }
            Err(other) => return Err(other.into_transport_error()),
        };

        Ok(Self {
            client,
            base_url,
            credentials: params.credentials().cloned(),
        })
    }

    /// Base URI every request is sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request_url(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if !request.query_params().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in request.query_params() {
                pairs.append_pair(&param.name, &param.value);
            }
        }
        url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    fn with_headers(builder: RequestBuilder, request: &ApiRequest) -> RequestBuilder {
        request
            .headers()
            .iter()
            .fold(builder, |builder, (name, value)| {
                builder.header(name.as_str(), value.as_str())
            })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
        let url = self.base_url.as_str();
        let response = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|error| TransportError::network(url, error))?;
        check_status(url, &response)?;
        Ok(response)
    }

    async fn read_body(&self, response: Response) -> Result<String, TransportError> {
        response
            .text()
            .await
            .map_err(|error| TransportError::network(self.base_url.as_str(), error))
    }

    async fn multipart_form(request: &ApiRequest) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for file in request.files() {
            let bytes = tokio::fs::read(&file.path)
                .await
                .map_err(|error| TransportError::io(&file.path, error))?;
            let file_name = match file.path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => file.name.clone(),
            };
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(&file.content_type)
                .map_err(|error| TransportError::network(file.path.display().to_string(), error))?;
            form = form.part(file.name.clone(), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self, request), fields(action = request.label()))]
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportError> {
        let url = self.request_url(request);
        let builder = Self::with_headers(self.client.get(url), request);
        let response = self.send(builder).await?;
        let body = self.read_body(response).await?;
        debug!(bytes = body.len(), "GET completed");
        Ok(body)
    }

    #[instrument(level = "debug", skip(self, request), fields(action = request.label()))]
    async fn post(&self, request: &ApiRequest) -> Result<String, TransportError> {
        let url = self.request_url(request);
        let form = Self::multipart_form(request).await?;
        let builder = Self::with_headers(self.client.post(url), request).multipart(form);
        let response = self.send(builder).await?;
        let body = self.read_body(response).await?;
        debug!(bytes = body.len(), "POST completed");
        Ok(body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn authenticate(&self) -> Result<AuthHandshake, TransportError> {
        let url = self
            .base_url
            .join(TOKEN_PATH)
            .map_err(|_| TransportError::invalid_url(format!("{}{TOKEN_PATH}", self.base_url)))?;
        let response = self.send(self.client.get(url)).await?;

        let guid = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(extract_guid);
        let body = self.read_body(response).await?;

        Ok(AuthHandshake {
            token: strip_markup(&body),
            guid,
        })
    }
}

fn check_status(url: &str, response: &Response) -> Result<(), TransportError> {
    let status = response.status();
    if status.as_u16() > 299 {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        debug!(
            status = status.as_u16(),
            reason,
            "daemon returned error status"
        );
        return Err(TransportError::status(url, status.as_u16(), reason));
    }
    Ok(())
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

impl BuildClientFailure {
    fn into_transport_error(self) -> TransportError {
        match self {
            Self::Panic => TransportError::client_build(
                "HTTP client construction panicked while initializing networking",
            ),
            Self::Build(error) => {
                TransportError::client_build(format!("HTTP client construction failed: {error}"))
            }
        }
    }
}

fn try_build_client(
    (connect_timeout, read_timeout): (Duration, Duration),
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(connect_timeout, read_timeout);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(connect_timeout: Duration, read_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(read_timeout)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
