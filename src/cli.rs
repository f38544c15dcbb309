//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use utorrent_webapi::Priority;
use utorrent_webapi::poll::DEFAULT_POLL_DELAY;

/// Control a uTorrent daemon through its WebUI API.
///
/// Connection settings come from flags, then `$XDG_CONFIG_HOME/utorrent/config.toml`,
/// then built-in defaults (http://localhost:8080).
#[derive(Parser, Debug)]
#[command(name = "utorrent")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Daemon connection flags; unset values fall back to the config file.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Daemon host name or address
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// WebUI port (1-65535)
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// URL scheme
    #[arg(long, global = true, value_parser = ["http", "https"])]
    pub scheme: Option<String>,

    /// WebUI user name
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// WebUI password
    #[arg(long, global = true, env = "UTORRENT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all torrents
    List,

    /// Show one torrent, optionally waiting for it to appear
    Get {
        hash: String,
        /// Extra list refreshes before giving up
        #[arg(long, default_value_t = 0)]
        retries: u32,
        /// Delay between refreshes in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },

    /// Start torrents
    Start {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Stop torrents
    Stop {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Pause torrents
    Pause {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Start torrents ignoring queue limits
    ForceStart {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Resume paused torrents
    Unpause {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Re-verify downloaded data
    Recheck {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Remove torrents, keeping data
    Remove {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Remove torrents and delete data
    RemoveData {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Move torrents to the top of the queue
    QueueTop {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Move torrents up one queue position
    QueueUp {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Move torrents down one queue position
    QueueDown {
        #[arg(required = true)]
        hashes: Vec<String>,
    },
    /// Move torrents to the bottom of the queue
    QueueBottom {
        #[arg(required = true)]
        hashes: Vec<String>,
    },

    /// Add a torrent by magnet link or URL
    AddUrl { uri: String },

    /// Upload a .torrent file
    AddFile { path: PathBuf },

    /// List the files inside a torrent
    Files { hash: String },

    /// Show torrent properties
    Props { hash: String },

    /// Show daemon settings
    Settings,

    /// Change one daemon setting
    SetSetting { name: String, value: String },

    /// Set download priority (skip, low, normal, high or 0-3) for files by index
    SetPriority {
        hash: String,
        priority: Priority,
        #[arg(required = true)]
        indices: Vec<usize>,
    },
}
