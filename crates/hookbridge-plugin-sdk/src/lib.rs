//! # hookbridge-plugin-sdk
//!
//! SDK for developing webhook plugins for Hookbridge.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookbridge_plugin_sdk::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Debug, Default)]
//! struct MyPlugin;
//!
//! #[async_trait]
//! impl Handler for MyPlugin {
//!     async fn handle(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
//!         let mut result = invocation.payload.clone();
//!         result.insert("handled".to_string(), json!(true));
//!         Ok(result)
//!     }
//! }
//!
//! struct MyFactory;
//!
//! impl HandlerFactory for MyFactory {
//!     fn descriptor(&self) -> UnitDescriptor {
//!         UnitDescriptor::new("my-plugin", "Marks webhook payloads as handled")
//!     }
//!
//!     fn create(&self) -> Box<dyn Handler> {
//!         Box::new(MyPlugin)
//!     }
//! }
//!
//! export_plugin!(MyFactory);
//! ```
//!
//! Build the crate as a `cdylib` and drop the resulting library into a
//! plugin directory; the bridge discovers and loads it by file name.

pub mod macros;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use hookbridge_core::types::{HttpMethod, MethodSet, Payload};
    pub use hookbridge_plugin::loader::{ABI_VERSION, PluginRegistration};
    pub use hookbridge_plugin::traits::{
        Handler, HandlerError, HandlerFactory, Invocation, UnitDescriptor,
    };
}
