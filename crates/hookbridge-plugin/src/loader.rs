//! Dynamic plugin loader using `libloading`.
//!
//! A plugin unit is a shared library (.so / .dll / .dylib) exporting a
//! single registration symbol:
//!
//! ```c
//! extern PluginRegistration* hookbridge_plugin();
//! ```
//!
//! The SDK's `export_plugin!` macro generates this symbol; both sides must
//! be built against the same [`ABI_VERSION`].

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use hookbridge_core::{AppError, AppResult};

use crate::traits::{Handler, HandlerFactory, UnitDescriptor, UnitLoader};

/// ABI version stamped into every registration. Bumped whenever the
/// contract types change incompatibly.
pub const ABI_VERSION: u32 = 1;

/// Name of the registration symbol a plugin unit must export.
pub const REGISTRATION_SYMBOL: &[u8] = b"hookbridge_plugin";

/// The registration a plugin unit hands over at load time.
///
/// Ownership transfers to the host: the symbol returns
/// `Box::into_raw(Box::new(registration))` and the loader reclaims it with
/// `Box::from_raw`.
pub struct PluginRegistration {
    /// ABI version the unit was built against.
    pub abi_version: u32,
    /// Factory producing single-use handlers.
    pub factory: Box<dyn HandlerFactory>,
}

/// Type of the registration function exported by plugin units.
pub type RegisterFn = unsafe extern "C" fn() -> *mut PluginRegistration;

/// One loaded generation of a plugin unit.
///
/// Keeps the originating library handle alive for as long as any cache
/// generation references the unit; the factory is dropped before the
/// library.
pub struct LoadedUnit {
    descriptor: UnitDescriptor,
    factory: Box<dyn HandlerFactory>,
    _library: Option<libloading::Library>,
}

impl LoadedUnit {
    /// Wrap a factory with no backing library (compiled-in or test units).
    pub fn from_factory(factory: Box<dyn HandlerFactory>) -> Self {
        Self {
            descriptor: factory.descriptor(),
            factory,
            _library: None,
        }
    }

    fn with_library(factory: Box<dyn HandlerFactory>, library: libloading::Library) -> Self {
        Self {
            descriptor: factory.descriptor(),
            factory,
            _library: Some(library),
        }
    }

    /// The unit's metadata, computed once at load time.
    pub fn descriptor(&self) -> &UnitDescriptor {
        &self.descriptor
    }

    /// Create a fresh single-use handler.
    pub fn create_handler(&self) -> Box<dyn Handler> {
        self.factory.create()
    }
}

impl std::fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("descriptor", &self.descriptor)
            .field("dynamic", &self._library.is_some())
            .finish()
    }
}

/// Loads plugin units from shared libraries.
///
/// Loading executes the library's initialization code. Only load trusted
/// plugins built against the same SDK version.
#[derive(Debug, Default)]
pub struct DynamicLoader;

impl DynamicLoader {
    /// Creates a new dynamic loader.
    pub fn new() -> Self {
        Self
    }
}

impl UnitLoader for DynamicLoader {
    fn load(&self, path: &Path) -> AppResult<Arc<LoadedUnit>> {
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            AppError::load(format!(
                "Failed to load plugin library '{}': {}",
                path.display(),
                e
            ))
        })?;

        let registration = {
            let register: libloading::Symbol<RegisterFn> =
                unsafe { library.get(REGISTRATION_SYMBOL) }.map_err(|e| {
                    AppError::load(format!(
                        "Plugin '{}' missing 'hookbridge_plugin' symbol: {}",
                        path.display(),
                        e
                    ))
                })?;
            unsafe { Box::from_raw(register()) }
        };

        validate_abi(&registration, path)?;

        let unit = LoadedUnit::with_library(registration.factory, library);

        info!(
            path = %path.display(),
            name = %unit.descriptor().name,
            "Dynamic plugin loaded"
        );

        Ok(Arc::new(unit))
    }
}

/// Reject registrations built against a different SDK ABI.
fn validate_abi(registration: &PluginRegistration, path: &Path) -> AppResult<()> {
    if registration.abi_version != ABI_VERSION {
        return Err(AppError::load(format!(
            "Plugin '{}' was built against ABI version {} (host: {})",
            path.display(),
            registration.abi_version,
            ABI_VERSION
        )));
    }
    Ok(())
}
