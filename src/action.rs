//! Daemon actions and wire parameter names.

use std::fmt;

/// Query parameter naming the action.
pub const ACTION_PARAM: &str = "action";
/// Query parameter carrying the session token.
pub const TOKEN_PARAM: &str = "token";
/// Source URL for `add-url`.
pub const URL_PARAM: &str = "s";
/// Requests the torrent list.
pub const LIST_PARAM: &str = "list";
/// Cache id echo on list requests.
pub const CACHE_ID_PARAM: &str = "cid";
/// Torrent hash; repeated once per torrent.
pub const HASH_PARAM: &str = "hash";
/// File index for `setprio`; repeated once per file.
pub const FILE_INDEX_PARAM: &str = "f";
/// Priority value for `setprio`.
pub const PRIORITY_PARAM: &str = "p";
/// Multipart field name for `add-file`.
pub const TORRENT_FILE_PART: &str = "torrent_file";
/// Content type of uploaded `.torrent` files.
pub const TORRENT_CONTENT_TYPE: &str = "application/x-bittorrent";

/// Named daemon operation sent as the `action` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Stop,
    Pause,
    ForceStart,
    Unpause,
    Recheck,
    Remove,
    RemoveData,
    SetPriority,
    GetProperties,
    AddUrl,
    GetFiles,
    GetSettings,
    SetSetting,
    AddFile,
    QueueBottom,
    QueueDown,
    QueueTop,
    QueueUp,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Start,
        Self::Stop,
        Self::Pause,
        Self::ForceStart,
        Self::Unpause,
        Self::Recheck,
        Self::Remove,
        Self::RemoveData,
        Self::SetPriority,
        Self::GetProperties,
        Self::AddUrl,
        Self::GetFiles,
        Self::GetSettings,
        Self::SetSetting,
        Self::AddFile,
        Self::QueueBottom,
        Self::QueueDown,
        Self::QueueTop,
        Self::QueueUp,
    ];

    /// Wire name understood by the daemon.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::ForceStart => "forcestart",
            Self::Unpause => "unpause",
            Self::Recheck => "recheck",
            Self::Remove => "remove",
            Self::RemoveData => "removedata",
            Self::SetPriority => "setprio",
            Self::GetProperties => "getprops",
            Self::AddUrl => "add-url",
            Self::GetFiles => "getfiles",
            Self::GetSettings => "getsettings",
            Self::SetSetting => "setsetting",
            Self::AddFile => "add-file",
            Self::QueueBottom => "queuebottom",
            Self::QueueDown => "queuedown",
            Self::QueueTop => "queuetop",
            Self::QueueUp => "queueup",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
