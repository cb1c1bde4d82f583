//! The runtime extension instance trait and constructor plumbing.

use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Boxed error type returned by extension constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A constructed extension instance.
///
/// This is a pure marker interface; the capabilities an extension actually
/// exposes are declared on its descriptor and consumed by callers through
/// `as_any` downcasting or through a point-specific trait such as
/// [`Command`](crate::Command).
pub trait Extension: Any {
    /// Downcast access to the concrete extension type.
    fn as_any(&self) -> &dyn Any;
}

/// The slice of the owning application a constructor may see.
///
/// Service extensions are constructed with the host as their sole argument;
/// implementations downcast to the concrete application type when they need
/// more than the name.
pub trait Host {
    /// Normalized application name.
    fn name(&self) -> &str;

    /// Downcast access to the concrete host application.
    fn as_any(&self) -> &dyn Any;
}

/// Arguments handed to an extension factory.
pub enum CtorArgs<'a> {
    /// Caller-supplied constructor arguments.
    Args(&'a Value),
    /// Eager service construction: a borrow of the owning host.
    Host(&'a dyn Host),
}

static NULL_ARGS: Value = Value::Null;

impl<'a> CtorArgs<'a> {
    /// Caller-supplied arguments, or `Null` for service construction.
    pub fn args(&self) -> &'a Value {
        match self {
            CtorArgs::Args(value) => *value,
            CtorArgs::Host(_) => &NULL_ARGS,
        }
    }

    /// The owning host, present only during service construction.
    pub fn host(&self) -> Option<&'a dyn Host> {
        match self {
            CtorArgs::Args(_) => None,
            CtorArgs::Host(host) => Some(*host),
        }
    }
}

/// Constructor for an extension class.
///
/// Factory errors are implementation-specific and pass through the registry
/// unmodified.
pub type ExtensionFactory = Arc<dyn Fn(CtorArgs<'_>) -> Result<Box<dyn Extension>, BoxError>>;
