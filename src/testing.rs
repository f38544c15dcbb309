//! Scripted transport and recording sleeper for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::poll::Sleeper;
use crate::transport::{ApiRequest, AuthHandshake, HttpMethod, Transport, TransportError};

/// Default body for unscripted requests.
pub(crate) const OK_BODY: &str = r#"{"build":30303}"#;

/// Transport that replays queued results and records what it was sent.
///
/// Unscripted handshakes succeed with `token-N` / `guid-N`; unscripted requests
/// answer [`OK_BODY`].
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    handshakes: Mutex<VecDeque<Result<AuthHandshake, TransportError>>>,
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    handshake_calls: AtomicU32,
    requests: Mutex<Vec<(HttpMethod, ApiRequest)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_handshake(&self, result: Result<AuthHandshake, TransportError>) {
        self.handshakes.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_body(&self, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string()));
    }

    pub(crate) fn push_status(&self, status: u16) {
        let error = TransportError::status("http://daemon/gui/", status, "scripted");
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn handshake_calls(&self) -> u32 {
        self.handshake_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<(HttpMethod, ApiRequest)> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(
        &self,
        method: HttpMethod,
        request: &ApiRequest,
    ) -> Result<String, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((method, request.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(OK_BODY.to_string()))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportError> {
        self.next_response(HttpMethod::Get, request)
    }

    async fn post(&self, request: &ApiRequest) -> Result<String, TransportError> {
        self.next_response(HttpMethod::Post, request)
    }

    async fn authenticate(&self) -> Result<AuthHandshake, TransportError> {
        let n = self.handshake_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let scripted = self.handshakes.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(AuthHandshake {
                token: format!("token-{n}"),
                guid: Some(format!("guid-{n}")),
            })
        })
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}
