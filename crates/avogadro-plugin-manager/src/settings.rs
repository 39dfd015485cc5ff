use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use avogadro_plugin_sdk::{Category, SettingValue, Settings, SettingsError, SettingsGroup};
use tracing::debug;

use crate::store::FactoryStore;

/// Group holding the enabled state of every discovered plugin.
pub const PLUGINS_GROUP: &str = "Plugins";
/// Group tool instances write into when they are torn down.
pub const TOOLS_GROUP: &str = "tools";
/// Group extension instances write into when they are torn down.
pub const EXTENSIONS_GROUP: &str = "extensions";

/// Settings persisted as a flat JSON object of `group/key` entries.
#[derive(Debug)]
pub struct JsonSettings {
    path: PathBuf,
    values: BTreeMap<String, SettingValue>,
    dirty: bool,
}

impl JsonSettings {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let mut config_dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory",
            ))
        })?;
        config_dir.push("Avogadro");
        config_dir.push("settings.json");
        Ok(config_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Settings for JsonSettings {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: SettingValue) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        self.dirty = false;
        debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}

/// Persisted enabled state of a plugin, `true` when never recorded.
pub(crate) fn read_enabled(settings: &mut dyn Settings, category: Category, name: &str) -> bool {
    let mut root = SettingsGroup::root(settings);
    let mut plugins = root.group(PLUGINS_GROUP);
    let group = plugins.group(&category.index().to_string());
    group.bool_or(name, true)
}

/// Record the enabled state of every descriptor in `store`.
pub(crate) fn write_enabled_states(settings: &mut dyn Settings, store: &FactoryStore) {
    let mut root = SettingsGroup::root(settings);
    let mut plugins = root.group(PLUGINS_GROUP);
    for category in Category::ALL {
        let mut group = plugins.group(&category.index().to_string());
        for descriptor in store.descriptors(category) {
            group.set_bool(descriptor.name(), descriptor.is_enabled());
        }
    }
}
