use crate::error::{Result, SdkError};
use alloy_primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Contract addresses per network, as recorded in a build artifact's `networks` map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployments {
    addresses: HashMap<u64, Address>,
}

#[derive(Deserialize)]
struct Artifact {
    #[serde(default)]
    networks: HashMap<String, NetworkEntry>,
}

#[derive(Deserialize)]
struct NetworkEntry {
    address: Address,
}

impl Deployments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the address for a network
    pub fn with(mut self, network_id: u64, address: Address) -> Self {
        self.addresses.insert(network_id, address);
        self
    }

    /// Parse a build artifact such as `build/contracts/SupplyChain.json`
    pub fn from_artifact_json(json: &str) -> Result<Self> {
        let artifact: Artifact = serde_json::from_str(json)?;

        let mut addresses = HashMap::with_capacity(artifact.networks.len());
        for (key, entry) in artifact.networks {
            let network_id = key
                .parse()
                .map_err(|_| SdkError::Artifact(format!("network id '{}' is not a number", key)))?;
            addresses.insert(network_id, entry.address);
        }

        Ok(Self { addresses })
    }

    /// Load a build artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| SdkError::Artifact(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_artifact_json(&json)
    }

    pub fn address_for(&self, network_id: u64) -> Result<Address> {
        self.addresses
            .get(&network_id)
            .copied()
            .ok_or(SdkError::NotDeployed { network_id })
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Network ids with a registered deployment, ascending
    pub fn networks(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.addresses.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
