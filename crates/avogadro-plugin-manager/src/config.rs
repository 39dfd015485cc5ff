use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use avogadro_plugin_sdk::{CapabilityFactory, Category};

use crate::builtins;
use crate::error::PluginError;

/// Environment variable that replaces the compiled-in search paths.
pub const PLUGIN_PATH_ENV: &str = "AVOGADRO_PLUGINS";

const INSTALL_PREFIX: &str = match option_env!("AVOGADRO_INSTALL_PREFIX") {
    Some(prefix) => prefix,
    None => "/usr/local",
};

const INSTALL_LIBDIR: &str = match option_env!("AVOGADRO_INSTALL_LIBDIR") {
    Some(libdir) => libdir,
    None => "lib",
};

const PRODUCT_DIR: &str = "avogadro";

/// Per base path, categories are scanned in this order.
const SCAN_ORDER: [Category; Category::COUNT] = [
    Category::Color,
    Category::Engine,
    Category::Extension,
    Category::Tool,
];

/// Constructor for a factory linked into the host binary.
pub type BuiltinConstructor = fn() -> Result<Box<dyn CapabilityFactory>, PluginError>;

/// Which directory entries discovery attempts to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFilter {
    /// Only files ending in the platform's dynamic library suffix.
    #[default]
    LibrarySuffix,
    /// Every regular file.
    AllFiles,
}

impl FileFilter {
    pub fn accepts(self, path: &Path) -> bool {
        match self {
            FileFilter::AllFiles => true,
            FileFilter::LibrarySuffix => path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| {
                    name.len() > env::consts::DLL_SUFFIX.len()
                        && name.ends_with(env::consts::DLL_SUFFIX)
                })
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub search_paths: Vec<PathBuf>,
    pub file_filter: FileFilter,
    pub builtins: Vec<BuiltinConstructor>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_paths: default_search_paths(),
            file_filter: FileFilter::default(),
            builtins: builtins::default_builtins(),
        }
    }
}

impl DiscoveryConfig {
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            ..Self::default()
        }
    }

    /// Every directory discovery visits, in visiting order, paired with the
    /// category it is named after.
    pub fn plugin_directories(&self) -> Vec<(Category, PathBuf)> {
        self.search_paths
            .iter()
            .flat_map(|base| {
                SCAN_ORDER
                    .iter()
                    .map(move |category| (*category, base.join(category.subdirectory())))
            })
            .collect()
    }
}

/// Search paths taken from [`PLUGIN_PATH_ENV`], or the install location.
pub fn default_search_paths() -> Vec<PathBuf> {
    search_paths_from(env::var_os(PLUGIN_PATH_ENV))
}

/// Resolve search paths from an optional override value.
///
/// A present override is authoritative, even when it lists nothing.
pub fn search_paths_from(value: Option<OsString>) -> Vec<PathBuf> {
    match value {
        Some(value) => env::split_paths(&value)
            .filter(|path| !path.as_os_str().is_empty())
            .collect(),
        None => install_search_paths(),
    }
}

fn install_search_paths() -> Vec<PathBuf> {
    #[allow(unused_mut)]
    let mut paths = vec![PathBuf::from(INSTALL_PREFIX)
        .join(INSTALL_LIBDIR)
        .join(PRODUCT_DIR)];

    #[cfg(windows)]
    if let Some(dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir);
    }

    paths
}
