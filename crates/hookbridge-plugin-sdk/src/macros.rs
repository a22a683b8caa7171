//! Macros for plugin authors.

/// Export a [`HandlerFactory`](crate::prelude::HandlerFactory) as the
/// plugin registration symbol.
///
/// Expands to the `hookbridge_plugin` entry point the loader resolves,
/// stamped with the SDK's ABI version. Use once per `cdylib`.
///
/// ```rust,ignore
/// export_plugin!(MyFactory);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($factory:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn hookbridge_plugin() -> *mut $crate::prelude::PluginRegistration {
            let registration = $crate::prelude::PluginRegistration {
                abi_version: $crate::prelude::ABI_VERSION,
                factory: Box::new($factory),
            };
            Box::into_raw(Box::new(registration))
        }
    };
}
