//! User-Agent string sent by the HTTP transport.

/// Product token preceding the version.
const PRODUCT: &str = "utorrent-webapi";

/// Default User-Agent for daemon requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version}")
}
