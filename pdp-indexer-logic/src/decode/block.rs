use serde_json::Value;

use super::{hex_str, opt_hex_str, parse_hex_u64, parse_hex_u64_field};
use crate::error::IndexerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub input: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBlock {
    pub height: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub transactions: Vec<DecodedTransaction>,
}

/// Decodes `eth_getBlockByNumber(_, withTxs=true)`'s reply.
pub fn decode_block(value: &Value) -> Result<DecodedBlock, IndexerError> {
    let height = parse_hex_u64_field(value, "number")?;
    let hash = hex_str(value, "hash")?;
    let parent_hash = hex_str(value, "parentHash")?;
    let timestamp = parse_hex_u64_field(value, "timestamp")?;

    let transactions = value
        .get("transactions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| IndexerError::Decode("missing field `transactions`".into()))?
        .iter()
        .map(decode_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedBlock {
        height,
        hash,
        parent_hash,
        timestamp,
        transactions,
    })
}

fn decode_transaction(value: &Value) -> Result<DecodedTransaction, IndexerError> {
    Ok(DecodedTransaction {
        hash: hex_str(value, "hash")?,
        from: hex_str(value, "from")?,
        to: opt_hex_str(value, "to"),
        input: hex_str(value, "input")?,
        value: hex_str(value, "value")?,
    })
}

/// Parses a raw `0x..` height string as used by request builders and by the
/// scheduler when comparing against configured start heights.
pub fn parse_height(hex: &str) -> Result<u64, IndexerError> {
    parse_hex_u64(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_minimal_block() {
        let raw = serde_json::json!({
            "number": "0x64",
            "hash": "0xaaa",
            "parentHash": "0xbbb",
            "timestamp": "0x5f5e100",
            "transactions": [
                {"hash": "0x1", "from": "0xfrom", "to": "0xto", "input": "0xdeadbeef", "value": "0x0"}
            ]
        });

        let block = decode_block(&raw).unwrap();
        assert_eq!(block.height, 100);
        assert_eq!(block.hash, "0xaaa");
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].to.as_deref(), Some("0xto"));
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let raw = serde_json::json!({"number": "0x1"});
        assert!(decode_block(&raw).is_err());
    }
}
