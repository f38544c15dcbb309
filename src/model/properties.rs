//! Per-torrent properties returned by `getprops`.

use serde::{Deserialize, Deserializer, Serialize};

/// Tri-state switch used by several torrent properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    /// The daemon does not allow changing this property for the torrent.
    NotAllowed,
    #[default]
    Disabled,
    Enabled,
}

impl Toggle {
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            c if c < 0 => Self::NotAllowed,
            0 => Self::Disabled,
            _ => Self::Enabled,
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

fn toggle<'de, D>(deserializer: D) -> Result<Toggle, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(Toggle::from_code)
}

/// Trackers arrive as one string with `\r\n` separators and blank lines between tiers.
fn tracker_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Properties of one torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TorrentProperties {
    pub hash: String,
    #[serde(default, deserialize_with = "tracker_lines")]
    pub trackers: Vec<String>,
    /// Upload rate limit in bytes per second; 0 means unlimited.
    #[serde(default, rename = "ulrate")]
    pub upload_rate: i64,
    /// Download rate limit in bytes per second; 0 means unlimited.
    #[serde(default, rename = "dlrate")]
    pub download_rate: i64,
    #[serde(default, deserialize_with = "toggle")]
    pub superseed: Toggle,
    #[serde(default, deserialize_with = "toggle")]
    pub dht: Toggle,
    #[serde(default, deserialize_with = "toggle")]
    pub pex: Toggle,
    #[serde(default, deserialize_with = "toggle")]
    pub seed_override: Toggle,
    /// Seed ratio target in per mille.
    #[serde(default)]
    pub seed_ratio: i64,
    /// Seed time target in seconds.
    #[serde(default)]
    pub seed_time: i64,
    /// Upload slots.
    #[serde(default, rename = "ulslots")]
    pub upload_slots: i64,
}
