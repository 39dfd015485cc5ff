use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::Arc;

use avogadro_plugin_sdk::{
    CapabilityFactory, CapabilityInstance, Owner, PluginDeclaration, ENTRY_SYMBOL,
};
use libloading::Library;

use crate::error::PluginError;

/// Turns a file on disk into a capability factory.
pub trait ModuleLoader: Send {
    fn load(&mut self, path: &Path) -> Result<LoadedModule, PluginError>;
}

/// Loads shared libraries exporting a [`PluginDeclaration`].
#[derive(Debug, Default)]
pub struct DynamicLoader;

impl ModuleLoader for DynamicLoader {
    fn load(&mut self, path: &Path) -> Result<LoadedModule, PluginError> {
        if !path.exists() {
            return Err(PluginError::MissingBinary(path.to_path_buf()));
        }

        let library = unsafe { Library::new(path) }?;
        let declaration = unsafe {
            let symbol = library
                .get::<*const PluginDeclaration>(ENTRY_SYMBOL.as_bytes())
                .map_err(|_| PluginError::MissingEntry {
                    path: path.to_path_buf(),
                    symbol: ENTRY_SYMBOL,
                })?;
            *symbol
        };
        if declaration.is_null() {
            return Err(PluginError::MissingEntry {
                path: path.to_path_buf(),
                symbol: ENTRY_SYMBOL,
            });
        }

        let factory = unsafe { (*declaration).instantiate() }?;
        Ok(LoadedModule {
            factory,
            library: Some(Arc::new(library)),
        })
    }
}

/// A factory together with the library its code lives in.
pub struct LoadedModule {
    // Declared before `library` so the factory is dropped first.
    factory: Box<dyn CapabilityFactory>,
    library: Option<Arc<Library>>,
}

impl LoadedModule {
    /// Wrap a factory linked into the host.
    pub fn in_process(factory: Box<dyn CapabilityFactory>) -> Self {
        Self {
            factory,
            library: None,
        }
    }

    pub fn factory(&self) -> &dyn CapabilityFactory {
        self.factory.as_ref()
    }

    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }

    /// Create an instance and narrow it to the expected kind. `None` means the
    /// factory produced something unusable.
    pub(crate) fn instantiate<T: ?Sized>(
        &self,
        owner: &Owner,
        narrow: fn(CapabilityInstance) -> Option<Box<T>>,
    ) -> Option<Hosted<T>> {
        let instance = narrow(self.factory.create_instance(owner))?;
        Some(Hosted {
            instance,
            library: self.library.clone(),
        })
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("name", &self.factory.name())
            .field("category", &self.factory.category())
            .field("dynamic", &self.is_dynamic())
            .finish()
    }
}

/// A capability instance that keeps its originating library loaded for as
/// long as it lives.
pub struct Hosted<T: ?Sized> {
    instance: Box<T>,
    library: Option<Arc<Library>>,
}

impl<T: ?Sized> Hosted<T> {
    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }

    /// Take the bare instance.
    ///
    /// # Safety
    ///
    /// The returned box must not outlive the library it came from; when
    /// [`Hosted::is_dynamic`] is true that library may be unloaded by the
    /// next registry reload.
    pub unsafe fn into_inner(self) -> Box<T> {
        self.instance
    }
}

impl<T: ?Sized> Deref for Hosted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.instance
    }
}

impl<T: ?Sized> DerefMut for Hosted<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.instance
    }
}

impl<T: ?Sized> fmt::Debug for Hosted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hosted")
            .field("dynamic", &self.is_dynamic())
            .finish_non_exhaustive()
    }
}
