//! Torrent list payloads: full snapshots and deltas.

use serde_json::Value;

use super::DecodeError;
use crate::model::{Torrent, TorrentStatus};

const PAYLOAD: &str = "list";

/// Full snapshot member.
const TORRENTS_KEY: &str = "torrents";
/// Added or changed torrents in a delta.
const CHANGED_KEY: &str = "torrentp";
/// Hashes removed since the previous cache id.
const REMOVED_KEY: &str = "torrentm";
/// Cache id to echo on the next list request.
const CACHE_ID_KEY: &str = "torrentc";

/// Fields every torrent row must carry.
const REQUIRED_ROW_FIELDS: usize = 19;

/// Decoded list response.
///
/// `full_snapshot` is set when the daemon sent the whole list instead of a
/// delta; in that case `removed` is empty and `changed` holds every torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUpdate {
    pub full_snapshot: bool,
    pub changed: Vec<Torrent>,
    pub removed: Vec<String>,
    pub cache_id: Option<String>,
}

impl ListUpdate {
    /// Delta with the given changes, mostly useful for tests and replay.
    #[must_use]
    pub fn delta(changed: Vec<Torrent>, removed: Vec<String>, cache_id: Option<String>) -> Self {
        Self {
            full_snapshot: false,
            changed,
            removed,
            cache_id,
        }
    }
}

/// Decodes a list response body.
pub fn parse_torrent_list(body: &str) -> Result<ListUpdate, DecodeError> {
    let root: Value = serde_json::from_str(body).map_err(|e| DecodeError::json(PAYLOAD, e))?;
    let object = root
        .as_object()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, "root", "an object"))?;

    let cache_id = match object.get(CACHE_ID_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        Some(_) => return Err(DecodeError::invalid(PAYLOAD, CACHE_ID_KEY, "a string")),
    };

    if let Some(rows) = object.get(TORRENTS_KEY) {
        return Ok(ListUpdate {
            full_snapshot: true,
            changed: decode_rows(rows, TORRENTS_KEY)?,
            removed: Vec::new(),
            cache_id,
        });
    }

    let changed = match object.get(CHANGED_KEY) {
        Some(rows) => decode_rows(rows, CHANGED_KEY)?,
        None => Vec::new(),
    };
    let removed = match object.get(REMOVED_KEY) {
        Some(Value::Array(hashes)) => hashes
            .iter()
            .enumerate()
            .map(|(i, hash)| {
                hash.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        DecodeError::invalid(PAYLOAD, format!("{REMOVED_KEY}[{i}]"), "a string")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(DecodeError::invalid(PAYLOAD, REMOVED_KEY, "an array")),
    };

    Ok(ListUpdate::delta(changed, removed, cache_id))
}

fn decode_rows(rows: &Value, key: &str) -> Result<Vec<Torrent>, DecodeError> {
    let rows = rows
        .as_array()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, key, "an array"))?;
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let fields = row
                .as_array()
                .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{key}[{i}]"), "an array"))?;
            decode_torrent_row(fields)
        })
        .collect()
}

/// Decodes one positional torrent row.
pub(crate) fn decode_torrent_row(row: &[Value]) -> Result<Torrent, DecodeError> {
    if row.len() < REQUIRED_ROW_FIELDS {
        return Err(DecodeError::missing(
            PAYLOAD,
            format!("torrent row field {} of {REQUIRED_ROW_FIELDS}", row.len()),
        ));
    }

    let hash = text(row, 0, "hash")?;
    if hash.is_empty() {
        return Err(DecodeError::missing(PAYLOAD, "hash"));
    }

    Ok(Torrent {
        hash,
        status: TorrentStatus::from_bits(narrow(unsigned(row, 1, "status")?)),
        name: text(row, 2, "name")?,
        size: unsigned(row, 3, "size")?,
        progress_permille: narrow(unsigned(row, 4, "progress")?),
        downloaded: unsigned(row, 5, "downloaded")?,
        uploaded: unsigned(row, 6, "uploaded")?,
        ratio_permille: narrow(unsigned(row, 7, "ratio")?),
        upload_speed: unsigned(row, 8, "upload_speed")?,
        download_speed: unsigned(row, 9, "download_speed")?,
        eta_secs: signed(row, 10, "eta")?,
        label: text(row, 11, "label")?,
        peers_connected: narrow(unsigned(row, 12, "peers_connected")?),
        peers_in_swarm: narrow(unsigned(row, 13, "peers_in_swarm")?),
        seeds_connected: narrow(unsigned(row, 14, "seeds_connected")?),
        seeds_in_swarm: narrow(unsigned(row, 15, "seeds_in_swarm")?),
        availability: narrow(unsigned(row, 16, "availability")?),
        queue_order: signed(row, 17, "queue_order")?,
        remaining: unsigned(row, 18, "remaining")?,
        status_message: optional_text(row, 21).filter(|message| !message.is_empty()),
        added_on: optional_signed(row, 23).filter(|ts| *ts > 0),
        completed_on: optional_signed(row, 24).filter(|ts| *ts > 0),
        save_path: optional_text(row, 26).filter(|path| !path.is_empty()),
    })
}

fn text(row: &[Value], index: usize, field: &str) -> Result<String, DecodeError> {
    row[index]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{field} (#{index})"), "a string"))
}

fn signed(row: &[Value], index: usize, field: &str) -> Result<i64, DecodeError> {
    row[index]
        .as_i64()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{field} (#{index})"), "an integer"))
}

/// Negative values (the daemon's "unknown") clamp to zero.
fn unsigned(row: &[Value], index: usize, field: &str) -> Result<u64, DecodeError> {
    let value = &row[index];
    if let Some(v) = value.as_u64() {
        return Ok(v);
    }
    value
        .as_i64()
        .map(|_| 0)
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{field} (#{index})"), "an integer"))
}

fn narrow(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn optional_text(row: &[Value], index: usize) -> Option<String> {
    row.get(index).and_then(Value::as_str).map(str::to_string)
}

fn optional_signed(row: &[Value], index: usize) -> Option<i64> {
    row.get(index).and_then(Value::as_i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ROW_A: &str =
        r#"["AAAA",201,"Ubuntu ISO",1000,500,500,250,500,10,20,60,"linux",1,5,2,9,65536,1,500]"#;

    #[test]
    fn test_full_snapshot_with_cache_id() {
        let body = format!(r#"{{"build":30303,"torrents":[{ROW_A}],"torrentc":"958391"}}"#);
        let update = parse_torrent_list(&body).unwrap();

        assert!(update.full_snapshot);
        assert_eq!(update.cache_id.as_deref(), Some("958391"));
        assert_eq!(update.changed.len(), 1);
        let torrent = &update.changed[0];
        assert_eq!(torrent.hash, "AAAA");
        assert_eq!(torrent.name, "Ubuntu ISO");
        assert!(torrent.status.is_started());
        assert_eq!(torrent.progress_permille, 500);
        assert_eq!(torrent.label, "linux");
        assert_eq!(torrent.remaining, 500);
        assert_eq!(torrent.status_message, None);
    }

    #[test]
    fn test_delta_with_removals_and_numeric_cache_id() {
        let body = format!(
            r#"{{"build":1,"torrentp":[{ROW_A}],"torrentm":["BBBB","CCCC"],"torrentc":42}}"#
        );
        let update = parse_torrent_list(&body).unwrap();

        assert!(!update.full_snapshot);
        assert_eq!(update.changed.len(), 1);
        assert_eq!(update.removed, vec!["BBBB", "CCCC"]);
        assert_eq!(update.cache_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_empty_delta_without_cache_id() {
        let update = parse_torrent_list(r#"{"build":1}"#).unwrap();
        assert_eq!(update, ListUpdate::delta(Vec::new(), Vec::new(), None));
    }

    #[test]
    fn test_trailing_optional_fields() {
        let body = r#"{"torrents":[["AAAA",136,"n",1,1000,1,0,0,0,0,-1,"",0,0,0,0,0,-1,0,"","","Finished","",1700000000,1700003600,"","/data/n"]]}"#;
        let torrent = &parse_torrent_list(body).unwrap().changed[0];

        assert_eq!(torrent.eta_secs, -1);
        assert_eq!(torrent.queue_order, -1);
        assert_eq!(torrent.status_message.as_deref(), Some("Finished"));
        assert_eq!(torrent.added_on, Some(1_700_000_000));
        assert_eq!(torrent.completed_on, Some(1_700_003_600));
        assert_eq!(torrent.save_path.as_deref(), Some("/data/n"));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let err = parse_torrent_list(r#"{"torrents":[["AAAA",1,"n"]]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { .. }));
    }

    #[test]
    fn test_ill_typed_field_is_rejected() {
        let body = r#"{"torrents":[["AAAA","x","n",1,1,1,0,0,0,0,0,"",0,0,0,0,0,0,0]]}"#;
        let err = parse_torrent_list(body).unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_torrent_list("<html>").unwrap_err();
        let DecodeError::Json { payload, .. } = err else {
            panic!("expected a JSON error, got {err:?}");
        };
        assert_eq!(payload, "list");
    }
}
