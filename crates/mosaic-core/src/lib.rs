//! Host-side mosaic extension framework.
//!
//! A host application declares extension points (abstract capability
//! contracts), registers extension classes against them (directly or by
//! loading plugins), and later resolves a point and a name to a ready
//! instance:
//!
//! ```
//! use mosaic_core::prelude::*;
//! use std::any::Any;
//!
//! struct Dog {
//!     sound: String,
//! }
//!
//! impl Extension for Dog {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! # fn main() -> Result<(), ManagerError> {
//! let mut app = ExtensionManager::new("zoo")?;
//! app.register_point(ExtensionDescriptor::point("animal").with_capability("animal"))?;
//! app.register_class(
//!     ExtensionDescriptor::class("Dog")
//!         .with_name("dog")
//!         .with_capability("animal")
//!         .with_factory(|ctor| {
//!             let sound = ctor
//!                 .args()
//!                 .get("sound")
//!                 .and_then(Value::as_str)
//!                 .unwrap_or("woof")
//!                 .to_string();
//!             Ok(Box::new(Dog { sound }))
//!         }),
//! )?;
//!
//! let dog = app.get_extension("animal", "dog", &serde_json::json!({"sound": "arf"}))?;
//! assert_eq!(dog.as_any().downcast_ref::<Dog>().unwrap().sound, "arf");
//! # Ok(())
//! # }
//! ```
//!
//! All operations are synchronous and the framework carries no internal
//! locking; hosts confine registration to start-up and share the manager
//! read-only afterwards.

pub mod loader;
pub mod manager;
pub mod points;
pub mod registry;
pub mod resolver;

pub use loader::{PluginError, PluginLoader};
pub use manager::{ExtensionManager, ManagerError, PluginRecord};
pub use registry::{ExtensionClass, ExtensionRegistry, RegistryError};
pub use resolver::{LoadedModule, ModuleResolver, NativeResolver, ResolveError, StaticResolver};

// The declaration surface, re-exported for hosts that do not depend on the
// SDK crate directly.
pub use mosaic_sdk::{
    ArgumentSpec, ArgumentsError, BoxError, Capability, CapabilitySet, Command, CtorArgs,
    Extension, ExtensionDescriptor, ExtensionFactory, Host,
};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::loader::{PluginError, PluginLoader};
    pub use crate::manager::{ExtensionManager, ManagerError, PluginRecord};
    pub use crate::points;
    pub use crate::registry::{ExtensionClass, ExtensionRegistry, RegistryError};
    pub use crate::resolver::{
        LoadedModule, ModuleResolver, NativeResolver, ResolveError, StaticResolver,
    };
    pub use mosaic_sdk::prelude::*;
}
