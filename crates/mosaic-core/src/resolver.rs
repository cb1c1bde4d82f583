//! Module resolution for plugin loading.
//!
//! A [`ModuleResolver`] turns a fully-qualified module path into a loaded
//! symbol table; the loader neither knows nor cares whether the table came
//! from a dynamic library, a compiled-in registration table, or a manifest.

use mosaic_sdk::ExtensionDescriptor;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors raised while resolving a module path.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("module {module} not found")]
    NotFound { module: String },

    #[error("unable to open {path}: {source}")]
    Library {
        path: String,
        #[source]
        source: libloading::Error,
    },
}

/// A resolved module's symbol table.
pub trait LoadedModule {
    /// The module path this table was resolved from.
    fn path(&self) -> &str;

    /// Look up an exported extension list by symbol name.
    fn export(&self, symbol: &str) -> Option<Vec<ExtensionDescriptor>>;
}

/// Maps module paths to loaded symbol tables.
pub trait ModuleResolver {
    fn resolve(&self, module_path: &str) -> Result<Box<dyn LoadedModule>, ResolveError>;
}

/// Compiled-in module table, also the manifest-driven path: declaration
/// lists registered up front under their module paths.
#[derive(Debug, Default)]
pub struct StaticResolver {
    modules: HashMap<String, HashMap<String, Vec<ExtensionDescriptor>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the extension list a module exports under `symbol`.
    pub fn with_module(
        mut self,
        module_path: impl Into<String>,
        symbol: impl Into<String>,
        descriptors: Vec<ExtensionDescriptor>,
    ) -> Self {
        self.modules
            .entry(module_path.into())
            .or_default()
            .insert(symbol.into(), descriptors);
        self
    }
}

struct StaticModule {
    path: String,
    exports: HashMap<String, Vec<ExtensionDescriptor>>,
}

impl LoadedModule for StaticModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn export(&self, symbol: &str) -> Option<Vec<ExtensionDescriptor>> {
        self.exports.get(symbol).cloned()
    }
}

impl ModuleResolver for StaticResolver {
    fn resolve(&self, module_path: &str) -> Result<Box<dyn LoadedModule>, ResolveError> {
        let exports = self
            .modules
            .get(module_path)
            .ok_or_else(|| ResolveError::NotFound {
                module: module_path.to_string(),
            })?;
        Ok(Box::new(StaticModule {
            path: module_path.to_string(),
            exports: exports.clone(),
        }))
    }
}

/// Dynamic-library resolver.
///
/// A module path `myapp.plugins.foo` maps to the platform library file
/// `libmyapp_plugins_foo.so` (`.dylib`/`.dll` elsewhere), searched across
/// the configured directories. Opened libraries stay loaded for the
/// resolver's lifetime; factories returned by a module point into its code.
#[derive(Default)]
pub struct NativeResolver {
    search_paths: Vec<PathBuf>,
    libraries: RefCell<Vec<Arc<libloading::Library>>>,
}

impl NativeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    fn library_file_name(module_path: &str) -> String {
        format!(
            "{}{}{}",
            std::env::consts::DLL_PREFIX,
            module_path.replace('.', "_"),
            std::env::consts::DLL_SUFFIX
        )
    }

    fn locate(&self, file_name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }
}

struct NativeModule {
    path: String,
    library: Arc<libloading::Library>,
}

impl LoadedModule for NativeModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn export(&self, symbol: &str) -> Option<Vec<ExtensionDescriptor>> {
        type ExportFn = unsafe extern "Rust" fn() -> Vec<ExtensionDescriptor>;
        let export = unsafe {
            self.library
                .get::<ExportFn>(symbol.as_bytes())
                .ok()?
        };
        Some(unsafe { export() })
    }
}

impl ModuleResolver for NativeResolver {
    fn resolve(&self, module_path: &str) -> Result<Box<dyn LoadedModule>, ResolveError> {
        let file_name = Self::library_file_name(module_path);
        let file = self
            .locate(&file_name)
            .ok_or_else(|| ResolveError::NotFound {
                module: module_path.to_string(),
            })?;

        let library = unsafe { libloading::Library::new(&file) }.map_err(|source| {
            ResolveError::Library {
                path: file.display().to_string(),
                source,
            }
        })?;
        let library = Arc::new(library);
        self.libraries.borrow_mut().push(Arc::clone(&library));

        tracing::debug!("native module loaded: {} ({})", module_path, file.display());
        Ok(Box::new(NativeModule {
            path: module_path.to_string(),
            library,
        }))
    }
}

/// Whether a path looks like a loadable plugin library.
pub fn is_plugin_library(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| matches!(ext, "so" | "dylib" | "dll"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_resolver_round_trip() {
        let resolver = StaticResolver::new().with_module(
            "app.plugins.demo",
            "__app_extensions__",
            vec![ExtensionDescriptor::class("Demo").with_name("demo")],
        );

        let module = resolver.resolve("app.plugins.demo").unwrap();
        assert_eq!(module.path(), "app.plugins.demo");
        let exports = module.export("__app_extensions__").unwrap();
        assert_eq!(exports.len(), 1);
        assert!(module.export("__other_extensions__").is_none());
    }

    #[test]
    fn test_static_resolver_unknown_module() {
        let resolver = StaticResolver::new();
        assert!(matches!(
            resolver.resolve("app.plugins.missing"),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn test_library_file_name() {
        let name = NativeResolver::library_file_name("app.plugins.demo");
        assert!(name.contains("app_plugins_demo"));
        assert!(name.ends_with(std::env::consts::DLL_SUFFIX));
    }

    #[test]
    fn test_is_plugin_library() {
        assert!(is_plugin_library(Path::new("libdemo.so")));
        assert!(is_plugin_library(Path::new("demo.dll")));
        assert!(!is_plugin_library(Path::new("demo.rs")));
        assert!(!is_plugin_library(Path::new("demo")));
    }
}
