use anyhow::Context;
use serde::Deserialize;

/// External configuration consumed at startup: tracked contracts and the
/// triggers (events/functions) each one dispatches to a named handler.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    pub contracts: Vec<ContractConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContractConfig {
    pub name: String,
    pub address: String,
    pub triggers: Vec<TriggerConfig>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Event,
    Function,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TriggerConfig {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    /// Solidity-style signature, e.g. `RootsAdded(uint256,uint256[])`.
    /// Whitespace-insensitive.
    pub definition: String,
    pub handler: String,
}

impl Manifest {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest at `{path}`"))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing manifest at `{path}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_example_manifest_shape() {
        let yaml = r#"
contracts:
  - name: PDPVerifier
    address: "0x0000000000000000000000000000000000dEaD"
    triggers:
      - {type: event, definition: "RootsAdded(uint256,uint256[])", handler: roots_added}
      - {type: function, definition: "provePossession(uint256,(bytes32,bytes32[])[])", handler: transaction}
"#;
        let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.contracts.len(), 1);
        assert_eq!(manifest.contracts[0].triggers.len(), 2);
        assert_eq!(manifest.contracts[0].triggers[0].kind, TriggerKind::Event);
        assert_eq!(manifest.contracts[0].triggers[1].kind, TriggerKind::Function);
    }
}
