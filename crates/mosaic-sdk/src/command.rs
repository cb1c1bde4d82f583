//! The command collaborator contract.
//!
//! Commands are extensions consumed by a CLI front end outside this
//! framework. The framework only carries the contract: a help line, an
//! ordered list of argument descriptors forwarded verbatim to whatever
//! argument parser the front end uses, and an entry point returning a
//! process exit code.

use crate::extension::{Extension, Host};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One argument descriptor, forwarded untouched to the host's parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgumentSpec {
    /// Positional specification forms, e.g. `["-v", "--verbose"]`.
    #[serde(default)]
    pub flags: Vec<String>,

    /// Keyword specification, opaque to the framework.
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl ArgumentSpec {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(flags: I) -> Self {
        Self {
            flags: flags.into_iter().map(Into::into).collect(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Raised by a command when its parsed arguments turn out to be unusable.
///
/// The CLI layer reacts by printing the command's own help plus this
/// message on the diagnostic stream.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ArgumentsError(pub String);

/// Contract for extensions registered under the command point.
pub trait Command: Extension {
    /// One-line help text.
    fn help(&self) -> &str {
        ""
    }

    /// Argument descriptors, in declaration order.
    fn arguments(&self) -> Vec<ArgumentSpec> {
        Vec::new()
    }

    /// Run the command against already-parsed arguments.
    fn execute(&self, host: &dyn Host, args: &Value) -> Result<i32, ArgumentsError>;
}
