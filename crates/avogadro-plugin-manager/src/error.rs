use std::path::PathBuf;

use avogadro_plugin_sdk::{AbiError, SettingsError};
use thiserror::Error;

/// Errors that can occur while loading a plugin module.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin binary not found at {0}")]
    MissingBinary(PathBuf),
    #[error("failed to load plugin library: {0}")]
    LibraryLoad(#[from] libloading::Error),
    #[error("{} does not export `{symbol}`", path.display())]
    MissingEntry { path: PathBuf, symbol: &'static str },
    #[error("invalid plugin entry point: {0}")]
    Abi(#[from] AbiError),
    #[error("builtin plugin unavailable: {0}")]
    Builtin(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// A module that was found during discovery but could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub file_name: String,
    pub path: PathBuf,
    pub message: String,
}
