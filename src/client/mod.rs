//! API facade: one client per daemon connection.
//!
//! [`UTorrentClient`] composes the session manager, the authenticated invoker and
//! the torrent list cache behind typed operations. Everything stateful lives in
//! the client value, so hosts that share one client across tasks wrap it in a
//! single `tokio::sync::Mutex`.
//!
//! # Example
//!
//! ```no_run
//! use utorrent_webapi::{ConnectionParams, UTorrentClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams::new("localhost", 8080).with_credentials("admin", "secret");
//! let mut client = UTorrentClient::new(&params)?;
//! for torrent in client.get_all_torrents().await? {
//!     println!("{} {:.1}%", torrent.name, torrent.progress_percent());
//! }
//! # Ok(())
//! # }
//! ```

mod actions;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::action::{ACTION_PARAM, Action, HASH_PARAM};
use crate::cache::TorrentListCache;
use crate::config::ConnectionParams;
use crate::error::ClientError;
use crate::invoker::AuthenticatedInvoker;
use crate::message::{parse_file_lists, parse_properties, parse_settings, parse_torrent_list};
use crate::model::{ClientSettings, RequestResult, Torrent, TorrentFileList, TorrentProperties};
use crate::poll::{PollDecision, PollPolicy, Sleeper, TokioSleeper};
use crate::transport::{ApiRequest, HttpMethod, HttpTransport, Transport};

/// Client for one uTorrent daemon.
pub struct UTorrentClient<T: Transport = HttpTransport> {
    transport: T,
    invoker: AuthenticatedInvoker,
    cache: TorrentListCache,
    sleeper: Arc<dyn Sleeper>,
}

impl UTorrentClient<HttpTransport> {
    /// Creates a client that talks HTTP to the daemon described by `params`.
    ///
    /// No network traffic happens until the first operation.
    ///
    /// # Errors
    ///
    /// Returns `Request` when the parameters are invalid or the HTTP client
    /// cannot be built.
    pub fn new(params: &ConnectionParams) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(params)?;
        info!(server = %transport.base_url(), "Created uTorrent client");
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> UTorrentClient<T> {
    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            invoker: AuthenticatedInvoker::new(),
            cache: TorrentListCache::new(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the delay used between poll attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Token handshakes performed so far.
    pub fn session_handshakes(&self) -> u32 {
        self.invoker.sessions().handshake_count()
    }

    /// Torrents from the last refresh, without a network call.
    pub fn cached_torrents(&self) -> Vec<Torrent> {
        self.cache.snapshot()
    }

    /// Refreshes the cache and returns every torrent.
    ///
    /// # Errors
    ///
    /// Any invoker error, or `Decode` when the list payload is malformed.
    pub async fn get_all_torrents(&mut self) -> Result<Vec<Torrent>, ClientError> {
        self.refresh_torrents().await?;
        Ok(self.cache.snapshot())
    }

    /// Refreshes the cache and looks up one torrent. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Same as [`UTorrentClient::get_all_torrents`].
    pub async fn get_torrent(&mut self, hash: &str) -> Result<Option<Torrent>, ClientError> {
        self.refresh_torrents().await?;
        Ok(self.cache.lookup(hash).cloned())
    }

    /// Polls the list until `hash` appears: one attempt plus up to `retries`
    /// more, sleeping `delay` between them.
    ///
    /// # Errors
    ///
    /// `NotFoundWithinDeadline` once the budget is spent; list errors stop the
    /// poll immediately.
    pub async fn get_torrent_with_retry(
        &mut self,
        hash: &str,
        delay: Duration,
        retries: u32,
    ) -> Result<Torrent, ClientError> {
        self.wait_for_torrent(hash, PollPolicy::new(delay, retries))
            .await
    }

    /// Like [`UTorrentClient::get_torrent_with_retry`] with an explicit policy.
    ///
    /// # Errors
    ///
    /// `NotFoundWithinDeadline` once the budget is spent.
    #[instrument(skip(self), fields(attempts = policy.attempts()))]
    pub async fn wait_for_torrent(
        &mut self,
        hash: &str,
        policy: PollPolicy,
    ) -> Result<Torrent, ClientError> {
        let mut attempt = 1;
        loop {
            self.refresh_torrents().await?;
            if let Some(torrent) = self.cache.lookup(hash) {
                debug!(attempt, "Torrent found");
                return Ok(torrent.clone());
            }
            match policy.after_miss(attempt) {
                PollDecision::Wait(delay) => {
                    debug!(attempt, ?delay, "Torrent not listed yet");
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                PollDecision::GiveUp => {
                    return Err(ClientError::NotFoundWithinDeadline {
                        hash: hash.to_string(),
                        attempts: attempt,
                    });
                }
            }
        }
    }

    /// File lists for the given torrents.
    ///
    /// # Errors
    ///
    /// Invoker errors, or `Decode` for a malformed payload.
    pub async fn get_torrent_files(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<Vec<TorrentFileList>, ClientError> {
        let request = action_request(Action::GetFiles, hashes);
        let body = self.invoke(request, HttpMethod::Get).await?;
        Ok(parse_file_lists(&body)?)
    }

    /// File list for one torrent, if the daemon knows it.
    ///
    /// # Errors
    ///
    /// Same as [`UTorrentClient::get_torrent_files`].
    pub async fn get_torrent_files_for(
        &mut self,
        hash: &str,
    ) -> Result<Option<TorrentFileList>, ClientError> {
        Ok(self.get_torrent_files(&[hash]).await?.into_iter().next())
    }

    /// Properties for the given torrents.
    ///
    /// # Errors
    ///
    /// Invoker errors, or `Decode` for a malformed payload.
    pub async fn get_torrent_properties(
        &mut self,
        hashes: &[impl AsRef<str>],
    ) -> Result<Vec<TorrentProperties>, ClientError> {
        let request = action_request(Action::GetProperties, hashes);
        let body = self.invoke(request, HttpMethod::Get).await?;
        Ok(parse_properties(&body)?)
    }

    /// Properties for one torrent, if the daemon knows it.
    ///
    /// # Errors
    ///
    /// Same as [`UTorrentClient::get_torrent_properties`].
    pub async fn get_torrent_properties_for(
        &mut self,
        hash: &str,
    ) -> Result<Option<TorrentProperties>, ClientError> {
        let props = self.get_torrent_properties(&[hash]).await?;
        Ok(props.into_iter().next())
    }

    /// Every daemon setting.
    ///
    /// # Errors
    ///
    /// Invoker errors, or `Decode` for a malformed payload.
    pub async fn get_client_settings(&mut self) -> Result<ClientSettings, ClientError> {
        let no_hashes: [&str; 0] = [];
        let request = action_request(Action::GetSettings, &no_hashes);
        let body = self.invoke(request, HttpMethod::Get).await?;
        Ok(parse_settings(&body)?)
    }

    #[instrument(level = "debug", skip(self))]
    async fn refresh_torrents(&mut self) -> Result<(), ClientError> {
        let request = ApiRequest::new().params(self.cache.list_request_params());
        let body = self.invoke(request, HttpMethod::Get).await?;
        self.cache.apply_update(parse_torrent_list(&body)?);
        Ok(())
    }

    async fn invoke(
        &mut self,
        request: ApiRequest,
        method: HttpMethod,
    ) -> Result<String, ClientError> {
        self.invoker.invoke(&self.transport, &request, method).await
    }

    /// Runs a state-changing action and classifies the response.
    ///
    /// An empty body is a logical `Fail` here, not an error.
    async fn invoke_action(
        &mut self,
        request: ApiRequest,
        method: HttpMethod,
    ) -> Result<RequestResult, ClientError> {
        let label = request.label().to_string();
        let result = match self.invoke(request, method).await {
            Ok(body) => RequestResult::from_response(Some(&body)),
            Err(ClientError::ServerResponseInvalid { .. }) => RequestResult::from_response(None),
            Err(e) => return Err(e),
        };
        debug!(action = %label, ?result, "Action completed");
        Ok(result)
    }
}

impl<T: Transport> fmt::Debug for UTorrentClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UTorrentClient")
            .field("invoker", &self.invoker)
            .field("cached_torrents", &self.cache.len())
            .field("cache_id", &self.cache.cache_id())
            .finish_non_exhaustive()
    }
}

/// `action=<name>` followed by one `hash` per torrent.
fn action_request(action: Action, hashes: &[impl AsRef<str>]) -> ApiRequest {
    let mut request = ApiRequest::new().param(ACTION_PARAM, action.as_str());
    for hash in hashes {
        request = request.param(HASH_PARAM, hash.as_ref());
    }
    request
}
