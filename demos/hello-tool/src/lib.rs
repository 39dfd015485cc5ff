//! Minimal dynamically loaded plugin contributing a single tool.
//!
//! Build it and drop the resulting shared library into `<prefix>/tools/`
//! of any search path to have the registry pick it up.

use avogadro_plugin_sdk::prelude::*;

pub const NAME: &str = "Hello";

struct HelloTool {
    owner: Owner,
}

impl Capability for HelloTool {
    fn name(&self) -> &str {
        NAME
    }
}

impl Tool for HelloTool {
    fn write_settings(&self, settings: &mut SettingsGroup<'_>) {
        let mut group = settings.group(NAME);
        group.set_value("owner", self.owner.label().into());
    }
}

#[derive(Default)]
pub struct HelloToolFactory;

impl CapabilityFactory for HelloToolFactory {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Greets the molecule under the cursor"
    }

    fn category(&self) -> Category {
        Category::Tool
    }

    fn create_instance(&self, owner: &Owner) -> CapabilityInstance {
        CapabilityInstance::Tool(Box::new(HelloTool {
            owner: owner.clone(),
        }))
    }
}

declare_avogadro_plugin!(HelloToolFactory);
