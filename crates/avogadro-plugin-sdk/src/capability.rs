use std::fmt;

use crate::settings::SettingsGroup;
use crate::Category;

/// The object a capability instance is created on behalf of.
///
/// Hosts typically pass one owner per document window so capabilities can
/// tell which view they belong to. The registry never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Owner {
    label: String,
}

impl Owner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Behaviour shared by every capability instance.
pub trait Capability: Send {
    fn name(&self) -> &str;
}

/// Interactive tool (navigation, drawing, selection...).
pub trait Tool: Capability {
    /// Persist per-instance settings before the registry tears the tool down.
    fn write_settings(&self, _settings: &mut SettingsGroup<'_>) {}
}

/// Menu-driven extension.
pub trait Extension: Capability {
    /// Persist per-instance settings before the registry tears the extension down.
    fn write_settings(&self, _settings: &mut SettingsGroup<'_>) {}
}

/// Rendering engine.
pub trait Engine: Capability {}

/// Colouring scheme.
pub trait Color: Capability {}

/// A freshly created capability, tagged with its kind.
pub enum CapabilityInstance {
    Tool(Box<dyn Tool>),
    Extension(Box<dyn Extension>),
    Engine(Box<dyn Engine>),
    Color(Box<dyn Color>),
}

impl CapabilityInstance {
    pub fn category(&self) -> Category {
        match self {
            CapabilityInstance::Tool(_) => Category::Tool,
            CapabilityInstance::Extension(_) => Category::Extension,
            CapabilityInstance::Engine(_) => Category::Engine,
            CapabilityInstance::Color(_) => Category::Color,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CapabilityInstance::Tool(tool) => tool.name(),
            CapabilityInstance::Extension(extension) => extension.name(),
            CapabilityInstance::Engine(engine) => engine.name(),
            CapabilityInstance::Color(color) => color.name(),
        }
    }

    pub fn into_tool(self) -> Option<Box<dyn Tool>> {
        match self {
            CapabilityInstance::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn into_extension(self) -> Option<Box<dyn Extension>> {
        match self {
            CapabilityInstance::Extension(extension) => Some(extension),
            _ => None,
        }
    }

    pub fn into_engine(self) -> Option<Box<dyn Engine>> {
        match self {
            CapabilityInstance::Engine(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn into_color(self) -> Option<Box<dyn Color>> {
        match self {
            CapabilityInstance::Color(color) => Some(color),
            _ => None,
        }
    }
}

impl fmt::Debug for CapabilityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityInstance")
            .field("category", &self.category())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Probe;

    impl Capability for Probe {
        fn name(&self) -> &str {
            "Probe"
        }
    }

    impl Engine for Probe {}

    #[test]
    fn instance_reports_kind_and_name() {
        let instance = CapabilityInstance::Engine(Box::new(Probe));
        assert_eq!(instance.category(), Category::Engine);
        assert_eq!(instance.name(), "Probe");
        assert!(instance.into_tool().is_none());
    }
}
