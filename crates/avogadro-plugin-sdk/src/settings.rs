use std::collections::BTreeMap;

use thiserror::Error;

/// Value type stored by every settings backend.
pub type SettingValue = serde_json::Value;

/// Separator between nested group names in a settings key.
pub const KEY_SEPARATOR: char = '/';

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Hierarchical key-value store the registry persists plugin state into.
///
/// Keys are group paths joined with [`KEY_SEPARATOR`], e.g. `Plugins/0/Navigate`.
pub trait Settings: Send {
    fn value(&self, key: &str) -> Option<SettingValue>;
    fn set_value(&mut self, key: &str, value: SettingValue);
    fn remove(&mut self, key: &str);

    /// Flush pending writes to the backing medium.
    fn sync(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// A view of [`Settings`] scoped to a group prefix.
pub struct SettingsGroup<'a> {
    settings: &'a mut dyn Settings,
    prefix: String,
}

impl<'a> SettingsGroup<'a> {
    pub fn root(settings: &'a mut dyn Settings) -> Self {
        Self {
            settings,
            prefix: String::new(),
        }
    }

    /// Open a nested group. The parent is borrowed until the child is dropped.
    pub fn group(&mut self, name: &str) -> SettingsGroup<'_> {
        SettingsGroup {
            prefix: self.key(name),
            settings: &mut *self.settings,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn value(&self, key: &str) -> Option<SettingValue> {
        self.settings.value(&self.key(key))
    }

    pub fn set_value(&mut self, key: &str, value: SettingValue) {
        let key = self.key(key);
        self.settings.set_value(&key, value);
    }

    pub fn remove(&mut self, key: &str) {
        let key = self.key(key);
        self.settings.remove(&key);
    }

    /// Read a boolean, falling back to `default` when the key is absent or
    /// holds something that is not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.value(key) {
            Some(SettingValue::Bool(value)) => value,
            Some(SettingValue::String(text)) => match text.as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_value(key, SettingValue::Bool(value));
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", self.prefix, KEY_SEPARATOR, key)
        }
    }
}

/// In-memory settings, useful for hosts without persistence and for tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettings {
    values: BTreeMap<String, SettingValue>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: BTreeMap<String, SettingValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, SettingValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Settings for MemorySettings {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: SettingValue) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn groups_prefix_nested_keys() {
        let mut settings = MemorySettings::new();
        {
            let mut root = SettingsGroup::root(&mut settings);
            let mut plugins = root.group("Plugins");
            let mut tools = plugins.group("0");
            tools.set_bool("Navigate", false);
            assert_eq!(tools.prefix(), "Plugins/0");
        }
        assert_eq!(
            settings.value("Plugins/0/Navigate"),
            Some(SettingValue::Bool(false))
        );
    }

    #[test]
    fn bool_or_falls_back_to_default() {
        let mut settings = MemorySettings::new();
        settings.set_value("flags/text", SettingValue::String("false".into()));
        settings.set_value("flags/number", SettingValue::from(3));
        let mut root = SettingsGroup::root(&mut settings);
        let flags = root.group("flags");
        assert!(!flags.bool_or("text", true));
        assert!(flags.bool_or("number", true));
        assert!(flags.bool_or("missing", true));
    }
}
