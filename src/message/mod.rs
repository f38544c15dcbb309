//! Message decoding for daemon JSON payloads.
//!
//! Pure data mapping with no client state. Each function takes the raw response
//! body and returns model records or a [`DecodeError`].

mod error;
mod list;

pub use error::DecodeError;
pub use list::{ListUpdate, parse_torrent_list};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::model::{
    ClientSettings, Priority, Setting, SettingType, TorrentFile, TorrentFileList, TorrentProperties,
};

/// Decodes a `getfiles` body: `{"files":["HASH",[[name,size,downloaded,priority],...],...]}`.
pub fn parse_file_lists(body: &str) -> Result<Vec<TorrentFileList>, DecodeError> {
    const PAYLOAD: &str = "files";

    let root: Value = serde_json::from_str(body).map_err(|e| DecodeError::json(PAYLOAD, e))?;
    let entries = match root.get("files") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(DecodeError::invalid(PAYLOAD, "files", "an array")),
        None => return Err(DecodeError::missing(PAYLOAD, "files")),
    };

    let mut lists = Vec::new();
    let mut iter = entries.iter().enumerate();
    while let Some((i, hash)) = iter.next() {
        let hash = hash
            .as_str()
            .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("files[{i}]"), "a hash string"))?;
        let Some((j, rows)) = iter.next() else {
            return Err(DecodeError::missing(PAYLOAD, format!("file rows for {hash}")));
        };
        let rows = rows
            .as_array()
            .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("files[{j}]"), "an array"))?;

        let files = rows
            .iter()
            .enumerate()
            .map(|(k, row)| decode_file_row(row, &format!("{hash}[{k}]")))
            .collect::<Result<Vec<_>, _>>()?;
        lists.push(TorrentFileList {
            hash: hash.to_string(),
            files,
        });
    }
    Ok(lists)
}

fn decode_file_row(row: &Value, at: &str) -> Result<TorrentFile, DecodeError> {
    const PAYLOAD: &str = "files";

    let fields = row
        .as_array()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, at, "an array"))?;
    if fields.len() < 4 {
        return Err(DecodeError::missing(PAYLOAD, format!("{at} priority")));
    }
    let name = fields[0]
        .as_str()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{at} name"), "a string"))?;
    let size = fields[1]
        .as_u64()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{at} size"), "an integer"))?;
    let downloaded = fields[2]
        .as_u64()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{at} downloaded"), "an integer"))?;
    let priority = fields[3]
        .as_i64()
        .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{at} priority"), "an integer"))?;

    Ok(TorrentFile {
        name: name.to_string(),
        size,
        downloaded,
        priority: Priority::from_value(priority),
    })
}

#[derive(Deserialize)]
struct PropsEnvelope {
    props: Vec<TorrentProperties>,
}

/// Decodes a `getprops` body: `{"props":[{...},...]}`.
pub fn parse_properties(body: &str) -> Result<Vec<TorrentProperties>, DecodeError> {
    serde_json::from_str::<PropsEnvelope>(body)
        .map(|envelope| envelope.props)
        .map_err(|e| DecodeError::json("props", e))
}

/// Decodes a `getsettings` body: `{"settings":[[name,type,value],...]}`.
///
/// Unknown type codes are kept as strings.
pub fn parse_settings(body: &str) -> Result<ClientSettings, DecodeError> {
    const PAYLOAD: &str = "settings";

    let root: Value = serde_json::from_str(body).map_err(|e| DecodeError::json(PAYLOAD, e))?;
    let rows = match root.get("settings") {
        Some(Value::Array(rows)) => rows,
        Some(_) => return Err(DecodeError::invalid(PAYLOAD, "settings", "an array")),
        None => return Err(DecodeError::missing(PAYLOAD, "settings")),
    };

    let mut settings = ClientSettings::new();
    for (i, row) in rows.iter().enumerate() {
        let at = format!("settings[{i}]");
        let fields = row
            .as_array()
            .filter(|fields| fields.len() >= 3)
            .ok_or_else(|| {
                DecodeError::invalid(PAYLOAD, at.as_str(), "a [name, type, value] triple")
            })?;
        let name = fields[0]
            .as_str()
            .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{at} name"), "a string"))?;
        let code = fields[1]
            .as_i64()
            .ok_or_else(|| DecodeError::invalid(PAYLOAD, format!("{at} type"), "an integer"))?;
        let setting_type = SettingType::from_code(code).unwrap_or_else(|| {
            debug!(
                setting = name,
                code,
                "Unknown setting type, keeping value as string"
            );
            SettingType::String
        });
        let value = match &fields[2] {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };

        settings.insert(Setting {
            name: name.to_string(),
            value,
            setting_type,
        });
    }
    Ok(settings)
}
