//! Per-torrent file lists and download priorities.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// File download priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    DoNotDownload,
    Low,
    Normal,
    High,
}

impl Priority {
    /// Wire value sent as the `p` parameter.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Self::DoNotDownload => 0,
            Self::Low => 1,
            Self::Normal => 2,
            Self::High => 3,
        }
    }

    /// Maps a wire value back to a priority.
    #[must_use]
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::DoNotDownload),
            1 => Some(Self::Low),
            2 => Some(Self::Normal),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DoNotDownload => "skip",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Accepts `skip|low|normal|high` or the numeric wire value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" | "do-not-download" | "0" => Ok(Self::DoNotDownload),
            "low" | "1" => Ok(Self::Low),
            "normal" | "2" => Ok(Self::Normal),
            "high" | "3" => Ok(Self::High),
            other => Err(format!(
                "invalid priority '{other}': expected skip, low, normal, high or 0-3"
            )),
        }
    }
}

/// One file inside a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentFile {
    pub name: String,
    pub size: u64,
    pub downloaded: u64,
    /// `None` when the daemon reports a value outside 0-3.
    pub priority: Option<Priority>,
}

/// Files belonging to one torrent, in daemon index order.
///
/// The position of a file in `files` is the index expected by
/// `set_torrent_file_priority`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TorrentFileList {
    pub hash: String,
    pub files: Vec<TorrentFile>,
}
