//! Built-in precompiles: the preimage registries, the metadata registry
//! and the arithmetic/storage fixtures.

mod fixtures;
mod metadata_registry;
mod preimage_registry;

pub use fixtures::{Addition, KkvStore};
pub use metadata_registry::MetadataRegistry;
pub use preimage_registry::{BigPreimageRegistry, PreimageRegistry};

use primitives::{u64_to_address, Address};

/// Address of the flat preimage registry.
pub const PREIMAGE_REGISTRY_ADDRESS: Address = u64_to_address(0x80);
/// Address of the big preimage registry.
pub const BIG_PREIMAGE_REGISTRY_ADDRESS: Address = u64_to_address(0x81);
/// Address of the precompile metadata registry.
pub const METADATA_REGISTRY_ADDRESS: Address = u64_to_address(0x82);
/// Address of the addition fixture.
pub const ADDITION_ADDRESS: Address = u64_to_address(0x90);
/// Address of the keyed key-value fixture.
pub const KKV_STORE_ADDRESS: Address = u64_to_address(0x91);

#[cfg(feature = "std")]
pub use std_registry::default_registry;

#[cfg(feature = "std")]
mod std_registry {
    use super::*;
    use crate::{PrecompileMetadata, Registry};
    use alloc::sync::Arc;
    use once_cell::sync::OnceCell;

    /// The registry of built-in precompiles, active from block zero.
    pub fn default_registry() -> &'static Arc<Registry> {
        static INSTANCE: OnceCell<Arc<Registry>> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            Arc::new_cyclic(|weak| {
                let mut registry = Registry::new();
                let entries: [(PrecompileMetadata, Arc<dyn crate::Precompile>); 5] = [
                    (
                        PrecompileMetadata::new(
                            PREIMAGE_REGISTRY_ADDRESS,
                            "preimage_registry",
                            "flat content-addressed preimage registry",
                        ),
                        Arc::new(PreimageRegistry),
                    ),
                    (
                        PrecompileMetadata::new(
                            BIG_PREIMAGE_REGISTRY_ADDRESS,
                            "big_preimage_registry",
                            "merkle-radix preimage registry for large values",
                        ),
                        Arc::new(BigPreimageRegistry::default()),
                    ),
                    (
                        PrecompileMetadata::new(
                            METADATA_REGISTRY_ADDRESS,
                            "metadata_registry",
                            "framework and precompile metadata",
                        ),
                        Arc::new(MetadataRegistry::new(weak.clone())),
                    ),
                    (
                        PrecompileMetadata::new(
                            ADDITION_ADDRESS,
                            "addition",
                            "uint256 addition fixture",
                        ),
                        Arc::new(Addition),
                    ),
                    (
                        PrecompileMetadata::new(
                            KKV_STORE_ADDRESS,
                            "kkv_store",
                            "double-keyed key-value fixture",
                        ),
                        Arc::new(KkvStore),
                    ),
                ];
                for (metadata, precompile) in entries {
                    registry
                        .register(0, metadata, precompile)
                        .expect("built-in registration is static");
                }
                registry
            })
        })
    }
}
