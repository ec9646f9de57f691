use std::collections::HashMap;

use alloy::primitives::{keccak256, B256};

use crate::manifest::{Manifest, TriggerKind};

/// Resolved from the manifest at startup: which addresses are tracked, and
/// which handler a given topic-0 or 4-byte selector dispatches to.
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    contracts: HashMap<String, String>,
    event_handlers: HashMap<B256, String>,
    function_handlers: HashMap<[u8; 4], String>,
}

fn canonical_signature(definition: &str) -> String {
    definition.chars().filter(|c| !c.is_whitespace()).collect()
}

fn topic0_of(definition: &str) -> B256 {
    keccak256(canonical_signature(definition).as_bytes())
}

fn selector_of(definition: &str) -> [u8; 4] {
    let digest = keccak256(canonical_signature(definition).as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}

impl HandlerRegistry {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut registry = Self::default();

        for contract in &manifest.contracts {
            let address = contract.address.to_lowercase();
            registry.contracts.insert(address, contract.name.clone());

            for trigger in &contract.triggers {
                match trigger.kind {
                    TriggerKind::Event => {
                        registry
                            .event_handlers
                            .insert(topic0_of(&trigger.definition), trigger.handler.clone());
                    }
                    TriggerKind::Function => {
                        registry
                            .function_handlers
                            .insert(selector_of(&trigger.definition), trigger.handler.clone());
                    }
                }
            }
        }

        registry
    }

    pub fn is_tracked_address(&self, address: &str) -> bool {
        self.contracts.contains_key(&address.to_lowercase())
    }

    pub fn handler_for_topic0(&self, topic0: &B256) -> Option<&str> {
        self.event_handlers.get(topic0).map(String::as_str)
    }

    pub fn handler_for_selector(&self, selector: &[u8; 4]) -> Option<&str> {
        self.function_handlers.get(selector).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ContractConfig, TriggerConfig};

    fn manifest() -> Manifest {
        Manifest {
            contracts: vec![ContractConfig {
                name: "PDPVerifier".into(),
                address: "0xABCDEF0000000000000000000000000000dEaD".into(),
                triggers: vec![
                    TriggerConfig {
                        kind: TriggerKind::Event,
                        definition: "RootsAdded(uint256,uint256[])".into(),
                        handler: "roots_added".into(),
                    },
                    TriggerConfig {
                        kind: TriggerKind::Function,
                        definition: "provePossession(uint256,(bytes32,bytes32[])[])".into(),
                        handler: "transaction".into(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn resolves_tracked_address_case_insensitively() {
        let registry = HandlerRegistry::from_manifest(&manifest());
        assert!(registry.is_tracked_address("0xabcdef0000000000000000000000000000dead"));
        assert!(!registry.is_tracked_address("0x0000000000000000000000000000000000beef"));
    }

    #[test]
    fn topic0_is_stable_under_whitespace() {
        let a = topic0_of("RootsAdded(uint256,uint256[])");
        let b = topic0_of("RootsAdded( uint256 , uint256[] )");
        assert_eq!(a, b);
    }

    #[test]
    fn resolves_event_and_function_handlers() {
        let registry = HandlerRegistry::from_manifest(&manifest());

        let topic0 = topic0_of("RootsAdded(uint256,uint256[])");
        assert_eq!(registry.handler_for_topic0(&topic0), Some("roots_added"));

        let selector = selector_of("provePossession(uint256,(bytes32,bytes32[])[])");
        assert_eq!(registry.handler_for_selector(&selector), Some("transaction"));
    }
}
