use std::path::{Path, PathBuf};

use avogadro_plugin_sdk::Category;
use serde::Serialize;

/// Position of a factory inside the registry for the current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactoryId {
    pub(crate) category: Category,
    pub(crate) slot: usize,
}

impl FactoryId {
    pub fn category(&self) -> Category {
        self.category
    }
}

/// Metadata about one discovered plugin module.
///
/// Descriptors are rebuilt from scratch on every discovery; the only field
/// that changes afterwards is `enabled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    name: String,
    description: String,
    category: Category,
    file_name: String,
    absolute_path: PathBuf,
    #[serde(skip)]
    factory: FactoryId,
    enabled: bool,
}

impl PluginDescriptor {
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        file_name: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        factory: FactoryId,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: factory.category,
            file_name: file_name.into(),
            absolute_path: absolute_path.into(),
            factory,
            enabled,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn factory(&self) -> FactoryId {
        self.factory
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
