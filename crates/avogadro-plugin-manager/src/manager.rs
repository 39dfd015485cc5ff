use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use avogadro_plugin_sdk::{
    CapabilityFactory, CapabilityInstance, Category, Color, Engine, Extension, Owner, Settings,
    SettingsError, SettingsGroup, Tool,
};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::InstanceCache;
use crate::config::DiscoveryConfig;
use crate::descriptor::PluginDescriptor;
use crate::error::LoadFailure;
use crate::events::{
    reload_channel, Observer, Observers, RegistryEvent, ReloadRequester, SubscriptionId,
};
use crate::loader::{DynamicLoader, Hosted, LoadedModule, ModuleLoader};
use crate::settings::{
    read_enabled, write_enabled_states, JsonSettings, EXTENSIONS_GROUP, TOOLS_GROUP,
};
use crate::store::FactoryStore;

/// Where the registry is in its load / reload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// Nothing discovered yet for the current epoch.
    Unloaded,
    /// Discovery has run; factories and descriptors are live.
    Loaded,
    /// A reload is tearing the epoch down.
    Reloading,
}

/// A registry shared between threads. Every access goes through the lock.
pub type SharedPluginManager = Arc<Mutex<PluginManager>>;

/// Discovers capability factories and hands out capability instances.
///
/// Discovery is lazy: the first accessor call of an epoch scans the search
/// paths. [`PluginManager::reload`] persists the enabled state, destroys
/// everything discovered, and lets the next accessor call start over.
pub struct PluginManager {
    config: DiscoveryConfig,
    settings: Box<dyn Settings>,
    loader: Box<dyn ModuleLoader>,
    cache: InstanceCache,
    store: FactoryStore,
    state: RegistryState,
    epoch: u64,
    failures: Vec<LoadFailure>,
    observers: Observers,
    requester: ReloadRequester,
    reload_requests: Receiver<()>,
}

impl PluginManager {
    pub fn new(config: DiscoveryConfig, settings: impl Settings + 'static) -> Self {
        Self::with_loader(config, settings, DynamicLoader)
    }

    pub fn with_loader(
        config: DiscoveryConfig,
        settings: impl Settings + 'static,
        loader: impl ModuleLoader + 'static,
    ) -> Self {
        let (requester, reload_requests) = reload_channel();
        Self {
            config,
            settings: Box::new(settings),
            loader: Box::new(loader),
            cache: InstanceCache::default(),
            store: FactoryStore::new(),
            state: RegistryState::Unloaded,
            epoch: 0,
            failures: Vec::new(),
            observers: Observers::default(),
            requester,
            reload_requests,
        }
    }

    /// Registry configured from the environment and the user's settings file.
    pub fn from_environment() -> Result<Self, SettingsError> {
        let settings = JsonSettings::open(JsonSettings::default_path()?)?;
        Ok(Self::new(DiscoveryConfig::default(), settings))
    }

    pub fn into_shared(self) -> SharedPluginManager {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn settings(&self) -> &dyn Settings {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn Settings {
        self.settings.as_mut()
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Number of discoveries run so far; the current epoch once loaded.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Modules that failed to load during the current epoch's discovery.
    pub fn load_failures(&mut self) -> &[LoadFailure] {
        self.ensure_discovered();
        &self.failures
    }

    /// Enabled factories of `category` in discovery order.
    pub fn factories(&mut self, category: Category) -> Vec<&dyn CapabilityFactory> {
        self.ensure_discovered();
        self.store.enabled(category)
    }

    /// Like [`PluginManager::factories`], addressed by raw category index.
    /// Out-of-range indices yield an empty list.
    pub fn factories_at(&mut self, index: usize) -> Vec<&dyn CapabilityFactory> {
        match Category::from_index(index) {
            Some(category) => self.factories(category),
            None => Vec::new(),
        }
    }

    pub fn disabled_factories(&mut self, category: Category) -> Vec<&dyn CapabilityFactory> {
        self.ensure_discovered();
        self.store.disabled(category)
    }

    /// First enabled factory of `category` named `name`.
    pub fn factory(&mut self, name: &str, category: Category) -> Option<&dyn CapabilityFactory> {
        self.ensure_discovered();
        self.store
            .find_enabled(category, name)
            .map(LoadedModule::factory)
    }

    pub fn plugin_descriptors(&mut self, category: Category) -> &[PluginDescriptor] {
        self.ensure_discovered();
        self.store.descriptors(category)
    }

    pub fn names(&mut self, category: Category) -> Vec<String> {
        self.factories(category)
            .into_iter()
            .map(|factory| factory.name().to_string())
            .collect()
    }

    pub fn descriptions(&mut self, category: Category) -> Vec<String> {
        self.factories(category)
            .into_iter()
            .map(|factory| factory.description().to_string())
            .collect()
    }

    /// Enable or disable a discovered plugin. The new state is persisted on
    /// the next [`PluginManager::write_settings`] or reload; cached instances
    /// are left alone until then. Returns `false` for unknown names.
    pub fn set_plugin_enabled(&mut self, category: Category, name: &str, enabled: bool) -> bool {
        self.ensure_discovered();
        let found = self.store.set_enabled(category, name, enabled);
        if found {
            debug!(%category, name, enabled, "plugin state changed");
        }
        found
    }

    /// A fresh tool, owned by the caller.
    pub fn tool(&mut self, name: &str, owner: &Owner) -> Option<Hosted<dyn Tool>> {
        self.instantiate(Category::Tool, name, owner, CapabilityInstance::into_tool)
    }

    /// A fresh extension, owned by the caller.
    pub fn extension(&mut self, name: &str, owner: &Owner) -> Option<Hosted<dyn Extension>> {
        self.instantiate(
            Category::Extension,
            name,
            owner,
            CapabilityInstance::into_extension,
        )
    }

    /// A fresh color, owned by the caller.
    pub fn color(&mut self, name: &str, owner: &Owner) -> Option<Hosted<dyn Color>> {
        self.instantiate(Category::Color, name, owner, CapabilityInstance::into_color)
    }

    /// A fresh engine, owned by the caller.
    pub fn engine(&mut self, name: &str, owner: &Owner) -> Option<Hosted<dyn Engine>> {
        self.instantiate(Category::Engine, name, owner, CapabilityInstance::into_engine)
    }

    /// Every enabled tool, created once per epoch.
    pub fn tools(&mut self, owner: &Owner) -> &[Hosted<dyn Tool>] {
        self.ensure_discovered();
        if !self.cache.tools.is_loaded() {
            let tools =
                instantiate_all(&self.store, Category::Tool, owner, CapabilityInstance::into_tool);
            self.cache.tools.fill(tools);
        }
        self.cache.tools.items()
    }

    /// Every enabled extension, created once per epoch.
    pub fn extensions(&mut self, owner: &Owner) -> &[Hosted<dyn Extension>] {
        self.ensure_discovered();
        if !self.cache.extensions.is_loaded() {
            let extensions = instantiate_all(
                &self.store,
                Category::Extension,
                owner,
                CapabilityInstance::into_extension,
            );
            self.cache.extensions.fill(extensions);
        }
        self.cache.extensions.items()
    }

    /// Every enabled color, created once per epoch.
    pub fn colors(&mut self, owner: &Owner) -> &[Hosted<dyn Color>] {
        self.ensure_discovered();
        if !self.cache.colors.is_loaded() {
            let colors = instantiate_all(
                &self.store,
                Category::Color,
                owner,
                CapabilityInstance::into_color,
            );
            self.cache.colors.fill(colors);
        }
        self.cache.colors.items()
    }

    /// Every enabled engine, created afresh on each call and owned by the
    /// caller.
    pub fn engines(&mut self, owner: &Owner) -> Vec<Hosted<dyn Engine>> {
        self.ensure_discovered();
        instantiate_all(
            &self.store,
            Category::Engine,
            owner,
            CapabilityInstance::into_engine,
        )
    }

    /// Persist the enabled / disabled split of every discovered plugin.
    pub fn write_settings(&mut self) -> Result<(), SettingsError> {
        write_enabled_states(self.settings.as_mut(), &self.store);
        self.settings.sync()
    }

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Handle through which other components can ask for a reload.
    pub fn reload_requester(&self) -> ReloadRequester {
        self.requester.clone()
    }

    /// Serve queued reload requests with a single reload. Returns whether a
    /// reload ran.
    pub fn process_reload_requests(&mut self) -> bool {
        let pending = self.reload_requests.try_iter().count();
        if pending == 0 {
            return false;
        }
        debug!(pending, "serving reload requests");
        self.reload();
        true
    }

    /// Persist state, destroy every instance, descriptor and factory of the
    /// current epoch, then notify observers.
    pub fn reload(&mut self) {
        if self.state == RegistryState::Reloading {
            return;
        }
        let ended = self.epoch;
        self.state = RegistryState::Reloading;

        write_enabled_states(self.settings.as_mut(), &self.store);
        {
            let tools = self.cache.tools.take();
            let mut root = SettingsGroup::root(self.settings.as_mut());
            let mut group = root.group(TOOLS_GROUP);
            for tool in tools {
                tool.write_settings(&mut group);
            }
        }
        {
            let extensions = self.cache.extensions.take();
            let mut root = SettingsGroup::root(self.settings.as_mut());
            let mut group = root.group(EXTENSIONS_GROUP);
            for extension in extensions {
                extension.write_settings(&mut group);
            }
        }
        if let Err(err) = self.settings.sync() {
            warn!(error = %err, "failed to persist plugin settings before reload");
        }

        // Colors carry no persist hook.
        self.cache.colors.take();
        debug_assert!(self.cache.is_empty());

        self.store.clear_descriptors();
        self.store.clear_factories();
        self.failures.clear();
        self.state = RegistryState::Unloaded;

        info!(epoch = ended, "plugins reloaded");
        self.observers
            .emit(&RegistryEvent::PluginsReloaded { epoch: ended });
    }

    fn ensure_discovered(&mut self) {
        if self.state == RegistryState::Unloaded {
            self.load_factories();
        }
    }

    fn load_factories(&mut self) {
        for constructor in &self.config.builtins {
            match constructor() {
                Ok(factory) => {
                    debug!(
                        name = factory.name(),
                        category = %factory.category(),
                        "registered builtin plugin"
                    );
                    self.store.insert_builtin(LoadedModule::in_process(factory));
                }
                Err(err) => warn!(error = %err, "instantiation of builtin plugin failed"),
            }
        }

        for (_, directory) in self.config.plugin_directories() {
            self.load_plugin_dir(&directory);
        }

        self.epoch += 1;
        self.state = RegistryState::Loaded;
        info!(
            epoch = self.epoch,
            tools = self.store.len(Category::Tool),
            extensions = self.store.len(Category::Extension),
            engines = self.store.len(Category::Engine),
            colors = self.store.len(Category::Color),
            failures = self.failures.len(),
            "plugin discovery finished"
        );
    }

    fn load_plugin_dir(&mut self, directory: &Path) {
        debug!(path = %directory.display(), "searching for plugins");
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %directory.display(), error = %err, "plugin directory unavailable");
                return;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.config.file_filter.accepts(path))
            .collect();
        files.sort();

        for path in files {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let absolute_path = fs::canonicalize(&path).unwrap_or(path);
            match self.loader.load(&absolute_path) {
                Ok(module) => {
                    let category = module.factory().category();
                    let name = module.factory().name().to_string();
                    let enabled = read_enabled(self.settings.as_mut(), category, &name);
                    debug!(
                        %category,
                        name = %name,
                        enabled,
                        file = %file_name,
                        "discovered plugin"
                    );
                    self.store
                        .insert_discovered(module, file_name, absolute_path, enabled);
                }
                Err(err) => {
                    warn!(file = %file_name, error = %err, "plugin failed to load");
                    self.failures.push(LoadFailure {
                        file_name,
                        path: absolute_path,
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    fn instantiate<T: ?Sized>(
        &mut self,
        category: Category,
        name: &str,
        owner: &Owner,
        narrow: fn(CapabilityInstance) -> Option<Box<T>>,
    ) -> Option<Hosted<T>> {
        self.ensure_discovered();
        let module = self.store.find_enabled(category, name)?;
        let instance = module.instantiate(owner, narrow);
        if instance.is_none() {
            warn!(%category, name, "factory produced an instance of the wrong kind");
        }
        instance
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        if let Err(err) = self.write_settings() {
            warn!(error = %err, "failed to persist plugin settings");
        }
    }
}

fn instantiate_all<T: ?Sized>(
    store: &FactoryStore,
    category: Category,
    owner: &Owner,
    narrow: fn(CapabilityInstance) -> Option<Box<T>>,
) -> Vec<Hosted<T>> {
    store
        .enabled_modules(category)
        .filter_map(|module| {
            let instance = module.instantiate(owner, narrow);
            if instance.is_none() {
                warn!(
                    %category,
                    name = module.factory().name(),
                    "skipping factory that produced an instance of the wrong kind"
                );
            }
            instance
        })
        .collect()
}
