//! Mosaic Extension SDK
//!
//! Everything a plugin (or a host application declaring its own extension
//! points) needs:
//! - the capability model points and classes match through,
//! - explicit declaration descriptors with builder APIs,
//! - the `Extension` instance trait and constructor plumbing,
//! - the command collaborator contract,
//! - the `declare_extensions!` export macro for dynamic plugins.
//!
//! # Quick start
//!
//! ```
//! use mosaic_sdk::prelude::*;
//! use std::any::Any;
//!
//! #[derive(Default)]
//! struct Dog;
//!
//! impl Extension for Dog {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let class = ExtensionDescriptor::class("Dog")
//!     .with_name("dog")
//!     .with_capability("animal")
//!     .with_factory(|_| Ok(Box::new(Dog)));
//! assert_eq!(class.name.as_deref(), Some("dog"));
//! ```

pub mod capability;
pub mod command;
pub mod descriptor;
pub mod extension;
#[macro_use]
pub mod macros;

pub use capability::{Capability, CapabilitySet};
pub use command::{ArgumentSpec, ArgumentsError, Command};
pub use descriptor::ExtensionDescriptor;
pub use extension::{BoxError, CtorArgs, Extension, ExtensionFactory, Host};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::capability::{Capability, CapabilitySet};
    pub use crate::command::{ArgumentSpec, ArgumentsError, Command};
    pub use crate::descriptor::ExtensionDescriptor;
    pub use crate::extension::{BoxError, CtorArgs, Extension, ExtensionFactory, Host};
    pub use serde_json::Value;
}
