//! Plugin registry and lifecycle manager.
//!
//! [`PluginManager`] discovers capability factories (builtins linked into
//! the host plus shared libraries found under the search paths), splits them
//! into enabled and disabled sets according to persisted settings, and hands
//! out capability instances either fresh (name lookups) or from a per-epoch
//! cache (bulk accessors). A reload persists the split, tears the epoch down,
//! and leaves the next accessor call to rediscover.
//!
//! The registry is single-owner and not internally synchronized. Hosts that
//! need it on several threads wrap it with [`PluginManager::into_shared`].

pub mod builtins;
mod cache;
mod config;
mod descriptor;
mod error;
mod events;
mod loader;
mod manager;
mod settings;
mod store;

pub use config::{
    default_search_paths, search_paths_from, BuiltinConstructor, DiscoveryConfig, FileFilter,
    PLUGIN_PATH_ENV,
};
pub use descriptor::{FactoryId, PluginDescriptor};
pub use error::{LoadFailure, PluginError};
pub use events::{Observer, RegistryEvent, ReloadRequester, SubscriptionId};
pub use loader::{DynamicLoader, Hosted, LoadedModule, ModuleLoader};
pub use manager::{PluginManager, RegistryState, SharedPluginManager};
pub use settings::{JsonSettings, EXTENSIONS_GROUP, PLUGINS_GROUP, TOOLS_GROUP};
pub use store::FactoryStore;

pub use avogadro_plugin_sdk as sdk;
