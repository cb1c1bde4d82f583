//! Plugin loading.
//!
//! A plugin is a module that exports an ordered list of extension class
//! descriptors under a well-known symbol. The loader derives the module
//! path and symbol name from the application name:
//! - module path: `<app>.plugins.<plugin>`, hyphens normalized to
//!   underscores in both segments;
//! - export symbol: `__<app>_extensions__`.

use crate::registry::{ExtensionRegistry, RegistryError};
use crate::resolver::{ModuleResolver, ResolveError};
use mosaic_sdk::ExtensionDescriptor;

/// Errors raised while loading a plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The module could not be resolved; wraps the underlying cause.
    #[error("unable to load plugin {plugin} ({module}): {source}")]
    LoadFailed {
        plugin: String,
        module: String,
        #[source]
        source: ResolveError,
    },

    /// The module resolved but does not carry the extension export.
    #[error("plugin {plugin} is missing the {symbol} export")]
    MissingExports { plugin: String, symbol: String },

    /// A registration failure, passed through unmodified.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Resolves plugin names to the extension classes they declare.
pub struct PluginLoader {
    app: String,
    resolver: Box<dyn ModuleResolver>,
}

impl PluginLoader {
    /// `app` is the host application name; hyphens are normalized to
    /// underscores so it can appear in module paths and symbol names.
    pub fn new(app: impl Into<String>, resolver: Box<dyn ModuleResolver>) -> Self {
        Self {
            app: app.into().replace('-', "_"),
            resolver,
        }
    }

    /// Normalized application name.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Fully-qualified module path for a plugin name.
    pub fn module_path(&self, plugin: &str) -> String {
        format!("{}.plugins.{}", self.app, plugin.replace('-', "_"))
    }

    /// The export symbol every plugin of this application must carry.
    pub fn export_symbol(&self) -> String {
        format!("__{}_extensions__", self.app)
    }

    /// Resolve a plugin and return the extension classes it declares, in
    /// declaration order.
    pub fn load(&self, plugin: &str) -> Result<Vec<ExtensionDescriptor>, PluginError> {
        let module = self.module_path(plugin);
        let loaded = self
            .resolver
            .resolve(&module)
            .map_err(|source| PluginError::LoadFailed {
                plugin: plugin.to_string(),
                module: module.clone(),
                source,
            })?;

        let symbol = self.export_symbol();
        let descriptors = loaded
            .export(&symbol)
            .ok_or_else(|| PluginError::MissingExports {
                plugin: plugin.to_string(),
                symbol,
            })?;

        tracing::debug!(
            "plugin {} resolved from {}: {} extension class(es)",
            plugin,
            module,
            descriptors.len()
        );
        Ok(descriptors)
    }

    /// Load a plugin and register every declared class into `registry`.
    ///
    /// Registration errors propagate unmodified; classes registered before
    /// the failing one stay registered, exactly as with direct calls.
    pub fn load_into(
        &self,
        registry: &mut ExtensionRegistry,
        plugin: &str,
    ) -> Result<usize, PluginError> {
        let descriptors = self.load(plugin)?;
        let count = descriptors.len();
        for descriptor in descriptors {
            registry.register_class(descriptor)?;
        }
        tracing::info!("plugin loaded: {} ({} class(es))", plugin, count);
        Ok(count)
    }
}
