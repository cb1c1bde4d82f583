//! Export macro for dynamically loadable plugins.

/// Declares the extension export a dynamically loadable plugin must carry.
///
/// The symbol name follows the host convention `__<app>_extensions__`; the
/// host's loader looks it up by that exact name after opening the plugin
/// library.
///
/// # Example
///
/// ```ignore
/// use mosaic_sdk::prelude::*;
///
/// declare_extensions!(__myapp_extensions__, [
///     ExtensionDescriptor::class("Dog")
///         .with_name("dog")
///         .with_capability("animal")
///         .with_factory(|_| Ok(Box::new(Dog::default()))),
/// ]);
/// ```
#[macro_export]
macro_rules! declare_extensions {
    ($symbol:ident, [$($descriptor:expr),* $(,)?]) => {
        #[no_mangle]
        pub extern "Rust" fn $symbol() -> ::std::vec::Vec<$crate::ExtensionDescriptor> {
            ::std::vec![$($descriptor),*]
        }
    };
}
