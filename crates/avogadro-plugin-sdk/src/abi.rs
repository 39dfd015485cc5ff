use thiserror::Error;

use crate::CapabilityFactory;

/// Name of the static every dynamic plugin module exports.
pub const ENTRY_SYMBOL: &str = "avogadro_plugin_declaration";

/// Marker identifying a declaration produced by this SDK.
pub const PLUGIN_ABI_TAG: [u8; 8] = *b"AVOPLUG\0";

/// Bumped whenever the layout of [`PluginDeclaration`] or the
/// [`CapabilityFactory`] contract changes.
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Opaque pointer a plugin hands back from its factory constructor.
#[repr(C)]
pub struct FactoryHandle {
    _private: [u8; 0],
}

pub type CreateFactoryFn = unsafe extern "C" fn() -> *mut FactoryHandle;

/// Entry point exported by a plugin module under [`ENTRY_SYMBOL`].
///
/// Hosts must call [`PluginDeclaration::validate`] before touching
/// `create_factory`.
#[repr(C)]
pub struct PluginDeclaration {
    pub tag: [u8; 8],
    pub abi_version: u32,
    pub create_factory: CreateFactoryFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("plugin entry point carries an unknown tag")]
    TagMismatch,
    #[error("plugin ABI version {found} does not match host version {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("plugin factory constructor returned null")]
    NullFactory,
}

impl PluginDeclaration {
    pub const fn new(create_factory: CreateFactoryFn) -> Self {
        Self {
            tag: PLUGIN_ABI_TAG,
            abi_version: PLUGIN_ABI_VERSION,
            create_factory,
        }
    }

    pub fn validate(&self) -> Result<(), AbiError> {
        if self.tag != PLUGIN_ABI_TAG {
            return Err(AbiError::TagMismatch);
        }
        if self.abi_version != PLUGIN_ABI_VERSION {
            return Err(AbiError::VersionMismatch {
                found: self.abi_version,
                expected: PLUGIN_ABI_VERSION,
            });
        }
        Ok(())
    }

    /// Validate the declaration and build the factory it describes.
    ///
    /// # Safety
    ///
    /// `create_factory` must come from a module built against this SDK and
    /// still be loaded.
    pub unsafe fn instantiate(&self) -> Result<Box<dyn CapabilityFactory>, AbiError> {
        self.validate()?;
        take_factory((self.create_factory)())
    }
}

/// Box a factory so it can cross the module boundary.
pub fn into_handle(factory: Box<dyn CapabilityFactory>) -> *mut FactoryHandle {
    Box::into_raw(Box::new(factory)) as *mut FactoryHandle
}

/// Reclaim a factory produced by [`into_handle`].
///
/// # Safety
///
/// `handle` must be null or come from [`into_handle`], and must not be
/// reclaimed twice.
pub unsafe fn take_factory(
    handle: *mut FactoryHandle,
) -> Result<Box<dyn CapabilityFactory>, AbiError> {
    if handle.is_null() {
        return Err(AbiError::NullFactory);
    }
    Ok(*Box::from_raw(handle as *mut Box<dyn CapabilityFactory>))
}

/// Export a capability factory from a dynamic plugin module.
///
/// # Example
///
/// ```ignore
/// use avogadro_plugin_sdk::declare_avogadro_plugin;
///
/// struct MeasureToolFactory;
///
/// impl CapabilityFactory for MeasureToolFactory { /* ... */ }
///
/// declare_avogadro_plugin!(MeasureToolFactory);
/// ```
#[macro_export]
macro_rules! declare_avogadro_plugin {
    ($factory:expr) => {
        #[doc(hidden)]
        pub extern "C" fn __avogadro_create_factory() -> *mut $crate::FactoryHandle {
            $crate::into_handle(::std::boxed::Box::new($factory))
        }

        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static avogadro_plugin_declaration: $crate::PluginDeclaration =
            $crate::PluginDeclaration::new(__avogadro_create_factory);
    };
}
