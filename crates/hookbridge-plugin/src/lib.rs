//! # hookbridge-plugin
//!
//! The plugin layer of Hookbridge: the capability contract plugin units
//! implement, directory discovery, the dynamic shared-library loader, and
//! the modification-time-keyed unit cache.

pub mod cache;
pub mod discovery;
pub mod loader;
pub mod traits;

pub use cache::UnitCache;
pub use loader::{
    ABI_VERSION, DynamicLoader, LoadedUnit, PluginRegistration, REGISTRATION_SYMBOL,
};
pub use traits::{Handler, HandlerError, HandlerFactory, Invocation, UnitDescriptor, UnitLoader};
