//! `magnet:` URI parsing and building.
//!
//! Pure string handling with no protocol state. A link keeps both its encoded and
//! decoded forms; the decoded form is what gets sent to the daemon's `add-url`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Required prefix of a decoded magnet link.
pub const MAGNET_PREFIX: &str = "magnet:?";

#[allow(clippy::expect_used)] // Static pattern, safe to panic
static INFO_HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-F]{40}$").expect("valid info-hash regex"));

#[allow(clippy::expect_used)] // Static pattern, safe to panic
static URN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^urn:btih:([0-9A-F]{40})$").expect("valid btih urn regex"));

/// Errors raised while parsing or building a magnet link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MagnetError {
    /// The decoded link does not start with `magnet:?`.
    #[error("not a magnet link: {link}")]
    NotMagnet {
        /// The decoded input.
        link: String,
    },

    /// The input is not valid percent-encoded UTF-8.
    #[error("magnet link is not valid percent-encoded UTF-8: {link}")]
    Encoding {
        /// The raw input.
        link: String,
    },

    /// A `tr` value is not a valid URI.
    #[error("invalid tracker URI '{tracker}' in magnet link: {reason}")]
    InvalidTracker {
        /// The tracker value.
        tracker: String,
        /// Parser message.
        reason: String,
    },

    /// The builder was given a hash that is not 40 uppercase hex characters.
    #[error("info-hash must be 40 uppercase hexadecimal characters, got '{hash}'")]
    InvalidHash {
        /// The rejected hash.
        hash: String,
    },

    /// The builder was used without a hash.
    #[error("magnet link builder requires an info-hash")]
    MissingHash,
}

/// Parsed magnet link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink {
    hash: Option<String>,
    name: Option<String>,
    trackers: Vec<Url>,
    encoded: String,
    decoded: String,
}

impl MagnetLink {
    /// Parses a (possibly percent-encoded) magnet link.
    ///
    /// Unrecognized keys and malformed `xt` values are skipped with a warning.
    /// Tokens that are not exactly `key=value` are skipped silently.
    pub fn parse(encoded: &str) -> Result<Self, MagnetError> {
        let decoded = urlencoding::decode(&encoded.replace('+', " "))
            .map_err(|_| MagnetError::Encoding {
                link: encoded.to_string(),
            })?
            .into_owned();

        let Some(query) = decoded.strip_prefix(MAGNET_PREFIX) else {
            return Err(MagnetError::NotMagnet { link: decoded });
        };

        let mut hash = None;
        let mut name = None;
        let mut trackers = Vec::new();

        for token in query.split('&') {
            let parts: Vec<&str> = token.split('=').collect();
            let [key, value] = parts.as_slice() else {
                continue;
            };
            match *key {
                "tr" => {
                    let tracker = Url::parse(value).map_err(|e| MagnetError::InvalidTracker {
                        tracker: (*value).to_string(),
                        reason: e.to_string(),
                    })?;
                    trackers.push(tracker);
                }
                "xt" => match URN_PATTERN.captures(value).and_then(|c| c.get(1)) {
                    Some(id) => hash = Some(id.as_str().to_string()),
                    None => warn!(urn = %value, "Failed to parse magnet URN, ignoring"),
                },
                "dn" => name = Some((*value).to_string()),
                other => warn!(key = %other, "Unrecognized magnet parameter, ignoring"),
            }
        }

        Ok(Self {
            hash,
            name,
            trackers,
            encoded: encoded.to_string(),
            decoded,
        })
    }

    /// Starts a builder for a link assembled from parts.
    #[must_use]
    pub fn builder() -> MagnetLinkBuilder {
        MagnetLinkBuilder::default()
    }

    /// Info-hash from the `xt` parameter, if one was valid.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Display name from `dn`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn trackers(&self) -> &[Url] {
        &self.trackers
    }

    /// The link exactly as given to [`MagnetLink::parse`].
    #[must_use]
    pub fn as_encoded(&self) -> &str {
        &self.encoded
    }

    /// The percent-decoded link.
    #[must_use]
    pub fn as_decoded(&self) -> &str {
        &self.decoded
    }
}

impl fmt::Display for MagnetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Builder for [`MagnetLink`]; validation happens in [`MagnetLinkBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct MagnetLinkBuilder {
    hash: Option<String>,
    name: Option<String>,
    trackers: Vec<String>,
}

impl MagnetLinkBuilder {
    #[must_use]
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn tracker(mut self, tracker: impl Into<String>) -> Self {
        self.trackers.push(tracker.into());
        self
    }

    /// Validates the hash and encodes the link.
    pub fn build(self) -> Result<MagnetLink, MagnetError> {
        let hash = self.hash.ok_or(MagnetError::MissingHash)?;
        if !INFO_HASH_PATTERN.is_match(&hash) {
            return Err(MagnetError::InvalidHash { hash });
        }

        let mut query = format!("xt=urn:btih:{hash}");
        if let Some(name) = &self.name {
            query.push_str("&dn=");
            query.push_str(name);
        }
        for tracker in &self.trackers {
            query.push_str("&tr=");
            query.push_str(tracker);
        }

        MagnetLink::parse(&format!("{MAGNET_PREFIX}{}", urlencoding::encode(&query)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HASH: &str = "C12FE1C06BBA254A9DC9F519B335AA7C1367A88A";

    #[test]
    fn test_parse_encoded_link() {
        let encoded = format!(
            "magnet:?xt=urn:btih:{HASH}&dn=Ubuntu+22.04&tr=udp%3A%2F%2Ftracker.example.org%3A1337%2Fannounce"
        );
        let link = MagnetLink::parse(&encoded).unwrap();

        assert_eq!(link.hash(), Some(HASH));
        assert_eq!(link.name(), Some("Ubuntu 22.04"));
        assert_eq!(link.trackers().len(), 1);
        assert_eq!(link.trackers()[0].scheme(), "udp");
        assert_eq!(link.as_encoded(), encoded);
        let decoded = link.as_decoded();
        assert!(decoded.contains("udp://tracker.example.org:1337/announce"));
    }

    #[test]
    fn test_wrong_scheme_is_rejected() {
        let err = MagnetLink::parse("http://example.com/?xt=urn:btih:abc").unwrap_err();
        assert!(matches!(err, MagnetError::NotMagnet { .. }));
    }

    #[test]
    fn test_lowercase_hash_is_ignored_not_fatal() {
        let raw = format!("magnet:?xt=urn:btih:{}&dn=x", HASH.to_lowercase());
        let link = MagnetLink::parse(&raw).unwrap();
        assert_eq!(link.hash(), None);
        assert_eq!(link.name(), Some("x"));
    }

    #[test]
    fn test_unknown_keys_and_bare_tokens_are_skipped() {
        let raw = format!("magnet:?xt=urn:btih:{HASH}&xl=10&flag&a=b=c");
        let link = MagnetLink::parse(&raw).unwrap();
        assert_eq!(link.hash(), Some(HASH));
        assert!(link.trackers().is_empty());
    }

    #[test]
    fn test_invalid_tracker_fails_parse() {
        let raw = format!("magnet:?xt=urn:btih:{HASH}&tr=not a uri");
        let err = MagnetLink::parse(&raw).unwrap_err();
        assert!(matches!(err, MagnetError::InvalidTracker { .. }));
    }

    #[test]
    fn test_builder_round_trips_through_parse() {
        let link = MagnetLink::builder()
            .hash(HASH)
            .name("Some Name")
            .tracker("http://tracker.example/announce")
            .build()
            .unwrap();

        assert_eq!(link.hash(), Some(HASH));
        assert_eq!(link.name(), Some("Some Name"));
        assert_eq!(
            link.trackers()[0].as_str(),
            "http://tracker.example/announce"
        );
        assert!(link.as_encoded().starts_with("magnet:?xt%3Durn%3Abtih%3A"));
        assert!(link.as_decoded().starts_with("magnet:?xt=urn:btih:"));
    }

    #[test]
    fn test_builder_rejects_bad_or_missing_hash() {
        assert_eq!(
            MagnetLink::builder().hash("abc").build().unwrap_err(),
            MagnetError::InvalidHash {
                hash: "abc".to_string()
            }
        );
        assert_eq!(
            MagnetLink::builder().build().unwrap_err(),
            MagnetError::MissingHash
        );
    }
}
