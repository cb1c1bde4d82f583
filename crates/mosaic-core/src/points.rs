//! Descriptors for the distinguished extension points.

use mosaic_sdk::ExtensionDescriptor;

/// Id of the service extension point.
///
/// Service classes are instantiated eagerly at registration time with the
/// owning manager as their sole constructor argument, and cached as
/// singletons.
pub const SERVICE: &str = "service";

/// Id of the command extension point consumed by CLI front ends.
pub const COMMAND: &str = "command";

/// Descriptor for the service point.
pub fn service() -> ExtensionDescriptor {
    ExtensionDescriptor::point(SERVICE).with_capability(SERVICE)
}

/// Descriptor for the command point.
pub fn command() -> ExtensionDescriptor {
    ExtensionDescriptor::point(COMMAND).with_capability(COMMAND)
}
