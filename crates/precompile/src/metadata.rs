use alloc::string::String;
use primitives::Address;

/// Name the framework reports through the metadata registry.
pub const FRAMEWORK_NAME: &str = "keystone";
/// Version the framework reports through the metadata registry.
pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Source URL the framework reports through the metadata registry.
pub const FRAMEWORK_SOURCE: &str = "https://github.com/keystone-evm/keystone";

/// Descriptive metadata attached to a registered precompile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrecompileMetadata {
    /// Address the precompile is registered at.
    pub address: Address,
    /// Human-readable name, unique within a registry.
    pub name: String,
    /// Implementation version.
    pub version: String,
    /// Source URL of the implementation.
    pub source: String,
    /// One-line description.
    pub description: String,
    /// Whether invocations run in a trusted environment, unlocking the
    /// privileged operations (ephemeral I/O, debug, time, metering).
    pub trusted: bool,
}

impl PrecompileMetadata {
    /// Creates untrusted metadata with the framework's version and source.
    pub fn new(address: Address, name: &str, description: &str) -> Self {
        Self {
            address,
            name: name.into(),
            version: FRAMEWORK_VERSION.into(),
            source: FRAMEWORK_SOURCE.into(),
            description: description.into(),
            trusted: false,
        }
    }

    /// Marks invocations of this precompile as trusted.
    pub fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }
}
