//! Extension point registry.
//!
//! The registry owns the mapping from each registered extension point to
//! the named extension classes registered under it, and enforces the
//! structural invariants:
//! - no two points may stand in an ancestry relation (one contract a
//!   subset of the other);
//! - a class registers under every point whose contract it satisfies, and
//!   its name must be free in all of them before any table is touched;
//! - a failed registration leaves the tables exactly as they were.
//!
//! Registration takes `&mut self` and the registry carries no internal
//! locking; hosts serialize mutation, typically by finishing all
//! registration during start-up.

use indexmap::IndexMap;
use mosaic_sdk::{BoxError, CapabilitySet, CtorArgs, Extension, ExtensionDescriptor, ExtensionFactory};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Errors raised by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The point descriptor declares no capabilities.
    #[error("extension point {id} declares no capabilities")]
    InvalidPoint { id: String },

    /// The descriptor carries an extension name, so it is a class.
    #[error("{id} carries the extension name {name:?}; it is an extension class, not a point")]
    NotAPoint { id: String, name: String },

    /// The point id or its exact contract is already registered.
    #[error("extension point {id} is already registered")]
    DuplicatePoint { id: String },

    /// The contract is a subset or superset of a registered point's.
    #[error("extension point {id} overlaps the contract of registered point {other}")]
    HierarchyConflict { id: String, other: String },

    /// The class descriptor is incomplete.
    #[error("{id} is not a valid extension class: {reason}")]
    InvalidExtension { id: String, reason: String },

    /// The class satisfies no registered point's contract.
    #[error("extension class {id} matches no registered extension point")]
    NoMatchingPoint { id: String },

    /// The name is already taken under a matching point.
    #[error("name {name} under point {point} is already registered by {existing}")]
    NameCollision {
        name: String,
        point: String,
        existing: String,
    },

    /// The point was never registered.
    #[error("unknown extension point {point}")]
    UnknownPoint { point: String },

    /// No class with that name under that point.
    #[error("no extension named {name} under point {point}")]
    NotFound { point: String, name: String },

    /// A factory failure, passed through unmodified.
    #[error(transparent)]
    Constructor(BoxError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// A validated, registered extension class.
pub struct ExtensionClass {
    id: String,
    name: String,
    capabilities: CapabilitySet,
    version: Option<semver::Version>,
    description: Option<String>,
    factory: ExtensionFactory,
}

impl ExtensionClass {
    fn from_descriptor(descriptor: ExtensionDescriptor) -> Result<Self> {
        let invalid = |reason: &str| RegistryError::InvalidExtension {
            id: descriptor.id.clone(),
            reason: reason.to_string(),
        };

        if descriptor.capabilities.is_empty() {
            return Err(invalid("declares no capabilities"));
        }
        let name = descriptor.name.clone().ok_or_else(|| invalid("missing extension name"))?;
        let factory = descriptor
            .factory
            .clone()
            .ok_or_else(|| invalid("missing factory"))?;

        Ok(Self {
            id: descriptor.id,
            name,
            capabilities: descriptor.capabilities,
            version: descriptor.version,
            description: descriptor.description,
            factory,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn version(&self) -> Option<&semver::Version> {
        self.version.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Invoke the class constructor.
    ///
    /// Errors are implementation-specific and returned as-is.
    pub fn construct(
        &self,
        args: CtorArgs<'_>,
    ) -> std::result::Result<Box<dyn Extension>, BoxError> {
        (self.factory)(args)
    }
}

impl fmt::Debug for ExtensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Debug)]
struct RegisteredPoint {
    contract: CapabilitySet,
    classes: IndexMap<String, Arc<ExtensionClass>>,
}

/// Registry of extension points and the classes registered under them.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    points: IndexMap<String, RegisteredPoint>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension point.
    pub fn register_point(&mut self, descriptor: ExtensionDescriptor) -> Result<()> {
        let id = descriptor.id;

        if descriptor.capabilities.is_empty() {
            return Err(RegistryError::InvalidPoint { id });
        }
        if let Some(name) = descriptor.name {
            return Err(RegistryError::NotAPoint { id, name });
        }
        if self.points.contains_key(&id) {
            return Err(RegistryError::DuplicatePoint { id });
        }

        let contract = descriptor.capabilities;
        for (other, point) in &self.points {
            // Two points with the same contract could never be told apart
            // by structural matching.
            if point.contract == contract {
                return Err(RegistryError::DuplicatePoint { id });
            }
            if contract.is_subset(&point.contract) || contract.is_superset(&point.contract) {
                return Err(RegistryError::HierarchyConflict {
                    id,
                    other: other.clone(),
                });
            }
        }

        tracing::debug!("extension point registered: {}", id);
        self.points.insert(
            id,
            RegisteredPoint {
                contract,
                classes: IndexMap::new(),
            },
        );
        Ok(())
    }

    /// Run every `register_class` check against a descriptor without
    /// touching the tables. Returns the number of matching points.
    pub fn validate_class(&self, descriptor: &ExtensionDescriptor) -> Result<usize> {
        let invalid = |reason: &str| RegistryError::InvalidExtension {
            id: descriptor.id.clone(),
            reason: reason.to_string(),
        };

        if descriptor.capabilities.is_empty() {
            return Err(invalid("declares no capabilities"));
        }
        let name = descriptor
            .name
            .as_deref()
            .ok_or_else(|| invalid("missing extension name"))?;
        if descriptor.factory.is_none() {
            return Err(invalid("missing factory"));
        }

        let mut matched = 0usize;
        for (point_id, point) in &self.points {
            if !point.contract.is_subset(&descriptor.capabilities) {
                continue;
            }
            matched += 1;
            if let Some(existing) = point.classes.get(name) {
                return Err(RegistryError::NameCollision {
                    name: name.to_string(),
                    point: point_id.clone(),
                    existing: existing.id.clone(),
                });
            }
        }
        if matched == 0 {
            return Err(RegistryError::NoMatchingPoint {
                id: descriptor.id.clone(),
            });
        }
        Ok(matched)
    }

    /// Register an extension class under every point it matches.
    ///
    /// All-or-nothing: every check in
    /// [`validate_class`](Self::validate_class) runs before any table is
    /// mutated.
    pub fn register_class(&mut self, descriptor: ExtensionDescriptor) -> Result<()> {
        let matched = self.validate_class(&descriptor)?;
        let class = Arc::new(ExtensionClass::from_descriptor(descriptor)?);
        for (_, point) in self.points.iter_mut() {
            if point.contract.is_subset(&class.capabilities) {
                point.classes.insert(class.name.clone(), Arc::clone(&class));
            }
        }

        tracing::info!(
            "extension class registered: {} under {} point(s)",
            class.name,
            matched
        );
        Ok(())
    }

    /// Resolve a class by point and name.
    pub fn lookup(&self, point: &str, name: &str) -> Result<Arc<ExtensionClass>> {
        let registered = self
            .points
            .get(point)
            .ok_or_else(|| RegistryError::UnknownPoint {
                point: point.to_string(),
            })?;
        registered
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                point: point.to_string(),
                name: name.to_string(),
            })
    }

    /// Names registered under a point, in registration order.
    ///
    /// The iterator is restartable by calling `names_for` again.
    pub fn names_for<'a>(&'a self, point: &str) -> Result<impl Iterator<Item = &'a str> + 'a> {
        let registered = self
            .points
            .get(point)
            .ok_or_else(|| RegistryError::UnknownPoint {
                point: point.to_string(),
            })?;
        Ok(registered.classes.keys().map(String::as_str))
    }

    /// Resolve a class and construct an instance from `args`.
    pub fn instantiate(&self, point: &str, name: &str, args: &Value) -> Result<Box<dyn Extension>> {
        let class = self.lookup(point, name)?;
        class
            .construct(CtorArgs::Args(args))
            .map_err(RegistryError::Constructor)
    }

    /// Lazily construct one instance per registered class of a point, in
    /// registration order.
    pub fn extensions_for<'a>(
        &'a self,
        point: &str,
        args: &'a Value,
    ) -> Result<impl Iterator<Item = (&'a str, Result<Box<dyn Extension>>)> + 'a> {
        let registered = self
            .points
            .get(point)
            .ok_or_else(|| RegistryError::UnknownPoint {
                point: point.to_string(),
            })?;
        Ok(registered.classes.iter().map(move |(name, class)| {
            (
                name.as_str(),
                class
                    .construct(CtorArgs::Args(args))
                    .map_err(RegistryError::Constructor),
            )
        }))
    }

    /// Whether a point is registered.
    pub fn has_point(&self, point: &str) -> bool {
        self.points.contains_key(point)
    }

    /// The contract of a registered point.
    pub fn point_contract(&self, point: &str) -> Option<&CapabilitySet> {
        self.points.get(point).map(|p| &p.contract)
    }

    /// Registered point ids, in registration order.
    pub fn point_ids(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }
}
