//! Extension manager façade.
//!
//! Composes the registry and the plugin loader behind one surface and adds
//! the service lifecycle: classes matching the service point are
//! instantiated eagerly at registration time, with the manager itself as
//! their sole constructor argument, and cached as singletons. A service
//! that cannot be constructed never makes it into the tables; a broken
//! service fails at start-up, not at first use.

use crate::loader::{PluginError, PluginLoader};
use crate::points;
use crate::registry::{ExtensionRegistry, RegistryError};
use crate::resolver::{ModuleResolver, NativeResolver};
use mosaic_sdk::{BoxError, CtorArgs, Extension, ExtensionDescriptor, Host};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Errors raised by manager operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// The application name is not usable in module paths and symbols.
    #[error("invalid application name {name:?}: must match ^[a-z_][a-z0-9_]*$ after hyphen normalization")]
    InvalidName { name: String },

    /// Eager service construction failed; the class was not registered.
    #[error("service {name} failed to construct: {cause}")]
    ServiceConstruction { name: String, cause: BoxError },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Bookkeeping for one successfully loaded plugin.
#[derive(Debug, Clone)]
pub struct PluginRecord {
    /// Plugin name as requested.
    pub plugin: String,
    /// Module path it resolved to.
    pub module: String,
    /// When the load completed.
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    /// Names of the extension classes it contributed.
    pub classes: Vec<String>,
}

fn name_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"(?i)^[a-z_][a-z0-9_]*$").expect("pattern is valid")
    })
}

/// The request/instantiate surface consumers use.
pub struct ExtensionManager {
    name: String,
    registry: ExtensionRegistry,
    loader: PluginLoader,
    services: HashMap<String, Arc<dyn Extension>>,
    plugins: Vec<PluginRecord>,
}

impl ExtensionManager {
    /// Create a manager with a [`NativeResolver`] without search paths;
    /// useful when plugins are registered directly rather than loaded.
    pub fn new(name: &str) -> Result<Self, ManagerError> {
        Self::with_resolver(name, Box::new(NativeResolver::new()))
    }

    /// Create a manager resolving plugin modules through `resolver`.
    ///
    /// `name` gets its hyphens normalized to underscores and must then
    /// match `^[a-z_][a-z0-9_]*$` (case-insensitive). The service point is
    /// registered up front.
    pub fn with_resolver(
        name: &str,
        resolver: Box<dyn ModuleResolver>,
    ) -> Result<Self, ManagerError> {
        let normalized = name.replace('-', "_");
        if !name_pattern().is_match(&normalized) {
            return Err(ManagerError::InvalidName {
                name: name.to_string(),
            });
        }

        let mut registry = ExtensionRegistry::new();
        registry.register_point(points::service())?;

        Ok(Self {
            loader: PluginLoader::new(&normalized, resolver),
            name: normalized,
            registry,
            services: HashMap::new(),
            plugins: Vec::new(),
        })
    }

    /// Normalized application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read access to the underlying registry.
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Register an extension point.
    pub fn register_point(&mut self, descriptor: ExtensionDescriptor) -> Result<(), ManagerError> {
        Ok(self.registry.register_point(descriptor)?)
    }

    /// Register an extension class.
    ///
    /// A class matching the service point is constructed right here, with
    /// this manager as the sole constructor argument; on construction
    /// failure the class is not registered. Registry validation runs
    /// first, so the factory of a descriptor the registry would reject
    /// never executes.
    pub fn register_class(&mut self, descriptor: ExtensionDescriptor) -> Result<(), ManagerError> {
        self.registry.validate_class(&descriptor)?;

        let matches_service = self
            .registry
            .point_contract(points::SERVICE)
            .map(|contract| contract.is_subset(&descriptor.capabilities))
            .unwrap_or(false);

        let eager = if matches_service {
            // Validation guarantees the name and factory are present.
            match (descriptor.name.clone(), descriptor.factory.clone()) {
                (Some(name), Some(factory)) => {
                    let instance = factory(CtorArgs::Host(&*self)).map_err(|cause| {
                        ManagerError::ServiceConstruction {
                            name: name.clone(),
                            cause,
                        }
                    })?;
                    Some((name, instance))
                }
                _ => None,
            }
        } else {
            None
        };

        self.registry.register_class(descriptor)?;

        if let Some((name, instance)) = eager {
            tracing::info!("service cached: {}", name);
            self.services.insert(name, Arc::from(instance));
        }
        Ok(())
    }

    /// Resolve a class by point and name.
    pub fn lookup(
        &self,
        point: &str,
        name: &str,
    ) -> Result<Arc<crate::registry::ExtensionClass>, ManagerError> {
        Ok(self.registry.lookup(point, name)?)
    }

    /// Names registered under a point, in registration order.
    pub fn names_for<'a>(
        &'a self,
        point: &str,
    ) -> Result<impl Iterator<Item = &'a str> + 'a, ManagerError> {
        Ok(self.registry.names_for(point)?)
    }

    /// Get an extension instance.
    ///
    /// For the service point, a cached instance is returned verbatim and
    /// `args` is ignored: service construction arguments were fixed at
    /// registration time. Everything else is constructed fresh per call.
    pub fn get_extension(
        &self,
        point: &str,
        name: &str,
        args: &Value,
    ) -> Result<Arc<dyn Extension>, ManagerError> {
        if point == points::SERVICE {
            if let Some(service) = self.services.get(name) {
                return Ok(Arc::clone(service));
            }
        }
        let instance = self.registry.instantiate(point, name, args)?;
        Ok(Arc::from(instance))
    }

    /// Get a cached service instance by name.
    pub fn get_service(&self, name: &str) -> Result<Arc<dyn Extension>, ManagerError> {
        self.get_extension(points::SERVICE, name, &Value::Null)
    }

    /// Lazily construct one instance per registered class of a point.
    pub fn extensions_for<'a>(
        &'a self,
        point: &str,
        args: &'a Value,
    ) -> Result<
        impl Iterator<Item = (&'a str, Result<Box<dyn Extension>, RegistryError>)> + 'a,
        ManagerError,
    > {
        Ok(self.registry.extensions_for(point, args)?)
    }

    /// Load a plugin and register every extension class it declares.
    ///
    /// Classes go through [`register_class`](Self::register_class), so
    /// plugin-delivered services are eagerly constructed and cached like
    /// directly registered ones. Registration errors propagate unmodified.
    pub fn load_plugin(&mut self, plugin: &str) -> Result<(), ManagerError> {
        let descriptors = self.loader.load(plugin)?;

        let mut classes = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            self.register_class(descriptor)?;
            if let Some(name) = name {
                classes.push(name);
            }
        }

        self.plugins.push(PluginRecord {
            plugin: plugin.to_string(),
            module: self.loader.module_path(plugin),
            loaded_at: chrono::Utc::now(),
            classes,
        });
        tracing::info!("plugin loaded: {}", plugin);
        Ok(())
    }

    /// Records for every successfully loaded plugin, in load order.
    pub fn loaded_plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }
}

impl Host for ExtensionManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for ExtensionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("services", &self.services.keys())
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}
