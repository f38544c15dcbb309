//! Torrent snapshot record and status bitfield.

use std::fmt;

use serde::Serialize;

/// Status bitfield reported by the daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TorrentStatus(u32);

impl TorrentStatus {
    pub const STARTED: u32 = 1;
    pub const CHECKING: u32 = 2;
    pub const START_AFTER_CHECK: u32 = 4;
    pub const CHECKED: u32 = 8;
    pub const ERROR: u32 = 16;
    pub const PAUSED: u32 = 32;
    pub const QUEUED: u32 = 64;
    pub const LOADED: u32 = 128;

    const NAMES: [(u32, &'static str); 8] = [
        (Self::STARTED, "started"),
        (Self::CHECKING, "checking"),
        (Self::START_AFTER_CHECK, "start_after_check"),
        (Self::CHECKED, "checked"),
        (Self::ERROR, "error"),
        (Self::PAUSED, "paused"),
        (Self::QUEUED, "queued"),
        (Self::LOADED, "loaded"),
    ];

    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    #[must_use]
    pub fn is_started(self) -> bool {
        self.contains(Self::STARTED)
    }

    #[must_use]
    pub fn is_checking(self) -> bool {
        self.contains(Self::CHECKING)
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        self.contains(Self::ERROR)
    }

    #[must_use]
    pub fn is_paused(self) -> bool {
        self.contains(Self::PAUSED)
    }

    #[must_use]
    pub fn is_queued(self) -> bool {
        self.contains(Self::QUEUED)
    }

    #[must_use]
    pub fn is_loaded(self) -> bool {
        self.contains(Self::LOADED)
    }

    /// Names of the set flags, lowest bit first.
    #[must_use]
    pub fn flag_names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.flag_names();
        if names.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&names.join("|"))
    }
}

/// Immutable snapshot of one torrent as last reported by the daemon.
///
/// Only `hash` is used for cache keying; every other field is payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Torrent {
    pub hash: String,
    pub status: TorrentStatus,
    pub name: String,
    /// Total size in bytes.
    pub size: u64,
    /// Progress in per mille (1000 = complete).
    pub progress_permille: u32,
    pub downloaded: u64,
    pub uploaded: u64,
    /// Share ratio in per mille.
    pub ratio_permille: u32,
    /// Bytes per second.
    pub upload_speed: u64,
    /// Bytes per second.
    pub download_speed: u64,
    /// Seconds remaining; -1 when unknown.
    pub eta_secs: i64,
    pub label: String,
    pub peers_connected: u32,
    pub peers_in_swarm: u32,
    pub seeds_connected: u32,
    pub seeds_in_swarm: u32,
    /// Availability in 1/65536 units.
    pub availability: u32,
    /// Queue position; -1 when not queued.
    pub queue_order: i64,
    /// Bytes remaining.
    pub remaining: u64,
    pub status_message: Option<String>,
    /// Unix timestamp.
    pub added_on: Option<i64>,
    /// Unix timestamp.
    pub completed_on: Option<i64>,
    pub save_path: Option<String>,
}

impl Torrent {
    /// Progress as a percentage in `0.0..=100.0`.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        f64::from(self.progress_permille) / 10.0
    }

    /// Share ratio as a plain number.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        f64::from(self.ratio_permille) / 1000.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress_permille >= 1000
    }
}
