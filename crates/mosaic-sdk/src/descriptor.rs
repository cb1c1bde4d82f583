//! Extension declaration descriptors.
//!
//! A single descriptor type declares both extension points and extension
//! classes; which one it is gets decided by the registry at registration
//! time. Points declare a capability contract and nothing else. Classes
//! additionally carry an extension name and a factory.
//!
//! Descriptors are ordinary values built through explicit calls; nothing is
//! discovered by reflection on magic attribute names.

use crate::capability::{Capability, CapabilitySet};
use crate::extension::{BoxError, CtorArgs, Extension, ExtensionFactory};
use std::fmt;
use std::sync::Arc;

/// Declares an extension point or an extension class.
#[derive(Clone)]
pub struct ExtensionDescriptor {
    /// Declaration identifier: the point id for points, an informational
    /// type id (e.g. the implementing type's name) for classes.
    pub id: String,

    /// Contract (points) or provided capabilities (classes).
    pub capabilities: CapabilitySet,

    /// Extension name, unique within every matching point. Classes only.
    pub name: Option<String>,

    /// Declared version.
    pub version: Option<semver::Version>,

    /// Human-readable description.
    pub description: Option<String>,

    /// Instance constructor. Classes only.
    pub factory: Option<ExtensionFactory>,
}

impl ExtensionDescriptor {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: CapabilitySet::new(),
            name: None,
            version: None,
            description: None,
            factory: None,
        }
    }

    /// Start declaring an extension point.
    pub fn point(id: impl Into<String>) -> Self {
        Self::new(id)
    }

    /// Start declaring an extension class.
    pub fn class(id: impl Into<String>) -> Self {
        Self::new(id)
    }

    /// Add one capability tag.
    pub fn with_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Add several capability tags.
    pub fn with_capabilities<C, I>(mut self, capabilities: I) -> Self
    where
        C: Into<Capability>,
        I: IntoIterator<Item = C>,
    {
        for capability in capabilities {
            self.capabilities.insert(capability);
        }
        self
    }

    /// Set the extension name (classes only).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the declared version.
    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the instance constructor (classes only).
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(CtorArgs<'_>) -> Result<Box<dyn Extension>, BoxError> + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }
}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("description", &self.description)
            .field("factory", &self.factory.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
