//! The precompile metadata registry.
//!
//! Serves framework identity and per-precompile metadata for whatever
//! registry governs the current deployment, resolved at the invocation's
//! block height.

use crate::{metadata, Precompile, PrecompileError, PrecompileMetadata, Registry};
use alloc::{string::ToString, sync::Weak, vec::Vec};
use alloy_sol_types::{sol, SolCall, SolValue};
use env::Environment;
use primitives::Bytes;

sol! {
    struct PrecompileInfo {
        address addr;
        string name;
        string version;
        string source;
        string description;
    }

    function getFramework() external view returns (string, string, string);
    function getPrecompile(address addr) external view returns (PrecompileInfo);
    function getPrecompileByName(string name) external view returns (address);
    function getPrecompiledAddresses() external view returns (address[]);
    function getPrecompiles() external view returns (PrecompileInfo[]);
}

fn to_info(metadata: &PrecompileMetadata) -> PrecompileInfo {
    PrecompileInfo {
        addr: metadata.address,
        name: metadata.name.clone(),
        version: metadata.version.clone(),
        source: metadata.source.clone(),
        description: metadata.description.clone(),
    }
}

/// Read-only registry introspection precompile.
///
/// Holds a weak handle so the registry can own the precompile without a
/// reference cycle.
#[derive(Clone, Debug)]
pub struct MetadataRegistry {
    registry: Weak<Registry>,
}

impl MetadataRegistry {
    /// Creates the precompile over a registry handle.
    pub fn new(registry: Weak<Registry>) -> Self {
        Self { registry }
    }
}

impl Precompile for MetadataRegistry {
    fn is_static(&self, _input: &[u8]) -> bool {
        true
    }

    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(PrecompileError::UnknownSelector)?;

        if selector == getFrameworkCall::SELECTOR {
            let framework = (
                metadata::FRAMEWORK_NAME.to_string(),
                metadata::FRAMEWORK_VERSION.to_string(),
                metadata::FRAMEWORK_SOURCE.to_string(),
            );
            return Ok(framework.abi_encode().into());
        }

        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| PrecompileError::revert("registry unavailable"))?;
        let block = env.block_number()?;

        match selector {
            s if s == getPrecompileCall::SELECTOR => {
                let call = getPrecompileCall::abi_decode(input)?;
                let metadata = registry
                    .metadata(call.addr, block)
                    .ok_or_else(|| PrecompileError::revert("precompile not found"))?;
                Ok(to_info(metadata).abi_encode().into())
            }
            s if s == getPrecompileByNameCall::SELECTOR => {
                let call = getPrecompileByNameCall::abi_decode(input)?;
                let address = registry
                    .lookup_by_name(&call.name, block)
                    .ok_or_else(|| PrecompileError::revert("precompile not found"))?;
                Ok(address.abi_encode().into())
            }
            s if s == getPrecompiledAddressesCall::SELECTOR => {
                let addresses = registry.addresses(block);
                Ok(addresses.abi_encode().into())
            }
            s if s == getPrecompilesCall::SELECTOR => {
                let infos: Vec<PrecompileInfo> = registry
                    .active_metadata(block)
                    .into_iter()
                    .map(to_info)
                    .collect();
                Ok(infos.abi_encode().into())
            }
            _ => Err(PrecompileError::UnknownSelector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{self, ADDITION_ADDRESS, METADATA_REGISTRY_ADDRESS};
    use alloc::string::String;
    use env::{BlockEnv, EnvConfig};
    use primitives::{Address, u64_to_address};
    use state::MemoryStateDB;

    fn run(input: &[u8]) -> Result<Bytes, PrecompileError> {
        let registry = builtins::default_registry();
        let precompile = registry
            .lookup(METADATA_REGISTRY_ADDRESS, 0)
            .unwrap()
            .clone();
        let mut db = MemoryStateDB::new();
        let block = BlockEnv {
            number: 1,
            ..Default::default()
        };
        let mut env = Environment::new(
            EnvConfig::new(METADATA_REGISTRY_ADDRESS, 1_000_000),
            &mut db,
        )
        .with_block_context(&block);
        precompile.run(&mut env, input)
    }

    #[test]
    fn framework_identity() {
        let output = run(&getFrameworkCall {}.abi_encode()).unwrap();
        let (name, version, source) =
            <(String, String, String)>::abi_decode(&output).unwrap();
        assert_eq!(name, "keystone");
        assert!(!version.is_empty());
        assert!(source.starts_with("https://"));
    }

    #[test]
    fn lookup_by_address_and_name() {
        let output = run(&getPrecompileCall {
            addr: ADDITION_ADDRESS,
        }
        .abi_encode())
        .unwrap();
        let info = PrecompileInfo::abi_decode(&output).unwrap();
        assert_eq!(info.addr, ADDITION_ADDRESS);
        assert_eq!(info.name, "addition");

        let output = run(&getPrecompileByNameCall {
            name: "addition".into(),
        }
        .abi_encode())
        .unwrap();
        assert_eq!(Address::abi_decode(&output).unwrap(), ADDITION_ADDRESS);
    }

    #[test]
    fn unknown_precompile_reverts() {
        let err = run(&getPrecompileCall {
            addr: u64_to_address(0xdead),
        }
        .abi_encode())
        .unwrap_err();
        assert_eq!(err, PrecompileError::revert("precompile not found"));
    }

    #[test]
    fn listings_cover_builtins() {
        let output = run(&getPrecompiledAddressesCall {}.abi_encode()).unwrap();
        let addresses = Vec::<Address>::abi_decode(&output).unwrap();
        assert_eq!(addresses.len(), 5);
        assert!(addresses.contains(&ADDITION_ADDRESS));

        let output = run(&getPrecompilesCall {}.abi_encode()).unwrap();
        let infos = Vec::<PrecompileInfo>::abi_decode(&output).unwrap();
        assert_eq!(infos.len(), 5);
    }
}
