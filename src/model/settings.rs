//! Daemon settings returned by `getsettings`.

use std::collections::HashMap;

use serde::Serialize;

/// Declared type of a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    Integer,
    Boolean,
    String,
}

impl SettingType {
    /// Maps the daemon's type code (0, 1, 2).
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Integer),
            1 => Some(Self::Boolean),
            2 => Some(Self::String),
            _ => None,
        }
    }
}

/// One setting; the value is kept as the daemon sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
    pub setting_type: SettingType,
}

impl Setting {
    /// Value as a boolean, for `Boolean` settings.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if self.setting_type != SettingType::Boolean {
            return None;
        }
        match self.value.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Value as an integer, for `Integer` settings.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if self.setting_type != SettingType::Integer {
            return None;
        }
        self.value.parse().ok()
    }
}

/// All settings keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    settings: HashMap<String, Setting>,
}

impl ClientSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a setting by name.
    pub fn insert(&mut self, setting: Setting) {
        self.settings.insert(setting.name.clone(), setting);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(name: &str, value: &str, setting_type: SettingType) -> Setting {
        Setting {
            name: name.to_string(),
            value: value.to_string(),
            setting_type,
        }
    }

    #[test]
    fn test_typed_accessors_respect_declared_type() {
        let port = setting("bind_port", "6881", SettingType::Integer);
        let dht = setting("dht", "true", SettingType::Boolean);
        let dir = setting("dir_active_download", "/data", SettingType::String);

        assert_eq!(port.as_i64(), Some(6881));
        assert_eq!(port.as_bool(), None);
        assert_eq!(dht.as_bool(), Some(true));
        assert_eq!(dir.as_i64(), None);
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut settings = ClientSettings::new();
        settings.insert(setting("dht", "true", SettingType::Boolean));
        settings.insert(setting("dht", "false", SettingType::Boolean));
        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("dht").and_then(Setting::as_bool), Some(false));
    }
}
