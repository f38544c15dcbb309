//! uTorrent WebUI client library
//!
//! Typed access to the HTTP control API exposed by a running uTorrent daemon:
//! list and inspect torrents, add them by magnet link or `.torrent` file, and
//! drive their lifecycle (start, stop, queue order, file priorities, settings).
//!
//! # Architecture
//!
//! - [`client`] - [`UTorrentClient`], the facade every operation goes through
//! - [`session`] - lazy token handshake and session invalidation
//! - [`invoker`] - attaches credentials and retries once on a rejected session
//! - [`cache`] - incremental torrent list keyed by the daemon's cache id
//! - [`transport`] - the [`Transport`] seam and its reqwest implementation
//! - [`message`] - JSON payload decoding
//! - [`model`] - torrent, file, property and setting records
//! - [`magnet`] - `magnet:` link parsing and building

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod invoker;
pub mod magnet;
pub mod message;
pub mod model;
pub mod poll;
pub mod session;
pub mod transport;
mod user_agent;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use action::Action;
pub use cache::TorrentListCache;
pub use client::UTorrentClient;
pub use config::{ConfigError, ConnectionParams, Credentials};
pub use error::{ClientError, ErrorKind};
pub use magnet::{MagnetError, MagnetLink};
pub use message::{DecodeError, ListUpdate};
pub use model::{
    ClientSettings, Priority, RequestResult, Setting, SettingType, Toggle, Torrent, TorrentFile,
    TorrentFileList, TorrentProperties, TorrentStatus,
};
pub use poll::{PollDecision, PollPolicy, Sleeper, TokioSleeper};
pub use session::{Session, SessionManager, SessionValidity};
pub use transport::{HttpStatusKind, HttpTransport, Transport, TransportError};
