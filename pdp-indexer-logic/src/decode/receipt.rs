use serde_json::Value;

use super::{hex_str, parse_hex_bytes, parse_hex_u64_field};
use crate::error::IndexerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: Vec<u8>,
    pub log_index: u64,
    pub removed: bool,
    pub block_number: u64,
    pub block_hash: String,
    pub transaction_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedReceipt {
    pub status: bool,
    pub logs: Vec<DecodedLog>,
}

pub fn decode_receipt(value: &Value) -> Result<DecodedReceipt, IndexerError> {
    let status = parse_hex_u64_field(value, "status")? != 0;

    let logs = value
        .get("logs")
        .and_then(|v| v.as_array())
        .ok_or_else(|| IndexerError::Decode("missing field `logs`".into()))?
        .iter()
        .map(decode_log)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedReceipt { status, logs })
}

fn decode_log(value: &Value) -> Result<DecodedLog, IndexerError> {
    let topics = value
        .get("topics")
        .and_then(|v| v.as_array())
        .ok_or_else(|| IndexerError::Decode("missing field `topics`".into()))?
        .iter()
        .map(|t| {
            t.as_str()
                .map(str::to_owned)
                .ok_or_else(|| IndexerError::Decode("non-string topic".into()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = parse_hex_bytes(&hex_str(value, "data")?)?;
    let removed = value
        .get("removed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(DecodedLog {
        address: hex_str(value, "address")?,
        topics,
        data,
        log_index: parse_hex_u64_field(value, "logIndex")?,
        removed,
        block_number: parse_hex_u64_field(value, "blockNumber")?,
        block_hash: hex_str(value, "blockHash")?,
        transaction_hash: hex_str(value, "transactionHash")?,
    })
}

impl DecodedLog {
    pub fn topic0(&self) -> Option<&str> {
        self.topics.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_receipt_with_one_log() {
        let raw = serde_json::json!({
            "status": "0x1",
            "logs": [{
                "address": "0xaddr",
                "topics": ["0xtopic0"],
                "data": "0x0102",
                "logIndex": "0x0",
                "removed": false,
                "blockNumber": "0x64",
                "blockHash": "0xaaa",
                "transactionHash": "0x1"
            }]
        });

        let receipt = decode_receipt(&raw).unwrap();
        assert!(receipt.status);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].topic0(), Some("0xtopic0"));
        assert_eq!(receipt.logs[0].data, vec![0x01, 0x02]);
    }
}
