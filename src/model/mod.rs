//! Plain records decoded from daemon payloads.

mod files;
mod properties;
mod result;
mod settings;
mod torrent;

pub use files::{Priority, TorrentFile, TorrentFileList};
pub use properties::{Toggle, TorrentProperties};
pub use result::{RequestResult, SUCCESS_MARKER};
pub use settings::{ClientSettings, Setting, SettingType};
pub use torrent::{Torrent, TorrentStatus};
