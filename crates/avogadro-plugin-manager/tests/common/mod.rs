#![allow(dead_code)]

use std::collections::HashMap;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use avogadro_plugin_manager::sdk::{
    AbiError, Capability, CapabilityFactory, CapabilityInstance, Category, Color, Engine,
    Extension, MemorySettings, Owner, SettingsGroup, Tool,
};
use avogadro_plugin_manager::{
    DiscoveryConfig, Hosted, LoadedModule, ModuleLoader, PluginError, PluginManager,
};

type Constructor = Box<dyn Fn() -> Box<dyn CapabilityFactory> + Send>;

/// Resolves modules by file name instead of loading shared libraries.
/// Unknown file names fail the way a corrupt binary would.
#[derive(Default)]
pub struct FakeLoader {
    modules: HashMap<String, Constructor>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        file_name: &str,
        constructor: impl Fn() -> Box<dyn CapabilityFactory> + Send + 'static,
    ) -> Self {
        self.modules.insert(file_name.to_string(), Box::new(constructor));
        self
    }

    /// Register a [`FakeFactory`] sharing `counters`.
    pub fn factory(
        self,
        file_name: &str,
        name: &'static str,
        category: Category,
        counters: &Counters,
    ) -> Self {
        let counters = counters.clone();
        self.with(file_name, move || {
            Box::new(FakeFactory {
                name,
                category,
                counters: counters.clone(),
            })
        })
    }
}

impl ModuleLoader for FakeLoader {
    fn load(&mut self, path: &Path) -> Result<LoadedModule, PluginError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        match self.modules.get(file_name) {
            Some(constructor) => Ok(LoadedModule::in_process(constructor())),
            None => Err(PluginError::Abi(AbiError::TagMismatch)),
        }
    }
}

/// Instance bookkeeping shared by every factory of a test.
#[derive(Clone, Default)]
pub struct Counters {
    pub created: Arc<AtomicUsize>,
    pub live: Arc<AtomicUsize>,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct FakeFactory {
    pub name: &'static str,
    pub category: Category,
    pub counters: Counters,
}

impl CapabilityFactory for FakeFactory {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "fake capability"
    }

    fn category(&self) -> Category {
        self.category
    }

    fn create_instance(&self, _owner: &Owner) -> CapabilityInstance {
        let serial = self.counters.created.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        let capability = FakeCapability {
            base: self.name,
            label: format!("{}#{serial}", self.name),
            live: Arc::clone(&self.counters.live),
        };
        match self.category {
            Category::Tool => CapabilityInstance::Tool(Box::new(capability)),
            Category::Extension => CapabilityInstance::Extension(Box::new(capability)),
            Category::Engine => CapabilityInstance::Engine(Box::new(capability)),
            Category::Color => CapabilityInstance::Color(Box::new(capability)),
        }
    }
}

/// A factory whose instances never match its declared category.
pub struct MismatchedFactory;

impl CapabilityFactory for MismatchedFactory {
    fn name(&self) -> &str {
        "Mismatched"
    }

    fn description(&self) -> &str {
        "claims to be a tool, builds colors"
    }

    fn category(&self) -> Category {
        Category::Tool
    }

    fn create_instance(&self, _owner: &Owner) -> CapabilityInstance {
        CapabilityInstance::Color(Box::new(FakeCapability {
            base: "Mismatched",
            label: "Mismatched".into(),
            live: Arc::new(AtomicUsize::new(1)),
        }))
    }
}

/// Capability whose name carries a creation serial, e.g. `Select#3`.
pub struct FakeCapability {
    base: &'static str,
    label: String,
    live: Arc<AtomicUsize>,
}

impl Capability for FakeCapability {
    fn name(&self) -> &str {
        &self.label
    }
}

impl Tool for FakeCapability {
    fn write_settings(&self, settings: &mut SettingsGroup<'_>) {
        settings.set_bool(self.base, true);
    }
}

impl Extension for FakeCapability {
    fn write_settings(&self, settings: &mut SettingsGroup<'_>) {
        settings.set_bool(self.base, true);
    }
}

impl Engine for FakeCapability {}

impl Color for FakeCapability {}

impl Drop for FakeCapability {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn library(stem: &str) -> String {
    format!("lib{stem}{DLL_SUFFIX}")
}

/// Create an empty file `base/<category dir>/<file_name>`.
pub fn touch(base: &Path, category: Category, file_name: &str) -> PathBuf {
    let dir = base.join(category.subdirectory());
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file_name);
    fs::write(&path, b"").unwrap();
    path
}

pub fn manager(
    base: &Path,
    loader: FakeLoader,
    settings: impl avogadro_plugin_manager::sdk::Settings + 'static,
) -> PluginManager {
    let config = DiscoveryConfig::with_search_paths(vec![base.to_path_buf()]);
    PluginManager::with_loader(config, settings, loader)
}

pub fn owner() -> Owner {
    Owner::new("main-window")
}

pub fn labels<T: Capability + ?Sized>(items: &[Hosted<T>]) -> Vec<String> {
    items.iter().map(|item| item.name().to_string()).collect()
}

/// Path of the `hello-tool` demo plugin, built on first use into its own
/// target directory so the outer build lock is not contended.
pub fn hello_tool_library() -> &'static Path {
    static BUILT: OnceLock<PathBuf> = OnceLock::new();
    BUILT.get_or_init(|| {
        let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("hello-tool");
        let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
        let status = Command::new(cargo)
            .args(["build", "--quiet", "-p", "avogadro-hello-tool", "--target-dir"])
            .arg(&target_dir)
            .current_dir(env!("CARGO_MANIFEST_DIR"))
            .status()
            .expect("failed to run cargo");
        assert!(status.success(), "building avogadro-hello-tool exited with {status}");
        target_dir
            .join("debug")
            .join(format!("{DLL_PREFIX}avogadro_hello_tool{DLL_SUFFIX}"))
    })
}

/// Copy the `hello-tool` plugin into `base/tools/` and return its file name.
pub fn install_hello_tool(base: &Path) -> String {
    let library = hello_tool_library();
    let file_name = library
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap()
        .to_string();
    let dir = base.join(Category::Tool.subdirectory());
    fs::create_dir_all(&dir).unwrap();
    fs::copy(library, dir.join(&file_name)).unwrap();
    file_name
}
