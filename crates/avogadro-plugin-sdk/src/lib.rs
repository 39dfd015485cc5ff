//! Avogadro Plugin SDK
//! ===================
//!
//! Types shared between the plugin registry and the modules it loads: the
//! capability categories, the capability traits, the
//! [`CapabilityFactory`] contract every plugin satisfies, the settings
//! interface capabilities persist themselves through, and the versioned
//! entry point dynamic modules export.

mod abi;
mod capability;
mod category;
mod factory;
mod settings;

pub use abi::{
    into_handle, take_factory, AbiError, CreateFactoryFn, FactoryHandle, PluginDeclaration,
    ENTRY_SYMBOL, PLUGIN_ABI_TAG, PLUGIN_ABI_VERSION,
};
pub use capability::{Capability, CapabilityInstance, Color, Engine, Extension, Owner, Tool};
pub use category::Category;
pub use factory::CapabilityFactory;
pub use settings::{
    MemorySettings, SettingValue, Settings, SettingsError, SettingsGroup, KEY_SEPARATOR,
};

/// Common imports for plugin authors.
pub mod prelude {
    pub use crate::{
        declare_avogadro_plugin, Capability, CapabilityFactory, CapabilityInstance, Category,
        Color, Engine, Extension, Owner, SettingsGroup, Tool,
    };
}
