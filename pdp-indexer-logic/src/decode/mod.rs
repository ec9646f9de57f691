pub mod block;
pub mod challenge;
pub mod cid;
pub mod event;
pub mod receipt;

pub use block::{decode_block, DecodedBlock, DecodedTransaction};
pub use challenge::challenge_leaf_index;
pub use cid::decode_cid;
pub use receipt::{decode_receipt, DecodedLog, DecodedReceipt};

use crate::error::IndexerError;

pub(crate) fn hex_str(value: &serde_json::Value, field: &str) -> Result<String, IndexerError> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .ok_or_else(|| IndexerError::Decode(format!("missing field `{field}`")))
}

pub(crate) fn opt_hex_str(value: &serde_json::Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}

pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, IndexerError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| IndexerError::Decode(format!("bad hex u64 `{s}`: {e}")))
}

pub(crate) fn parse_hex_u64_field(
    value: &serde_json::Value,
    field: &str,
) -> Result<u64, IndexerError> {
    parse_hex_u64(&hex_str(value, field)?)
}

pub(crate) fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, IndexerError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| IndexerError::Decode(format!("bad hex bytes `{s}`: {e}")))
}

/// The leading 4 bytes of a transaction's calldata, used to look up a
/// function handler in the registry. `None` for calldata shorter than that
/// (a plain value transfer).
pub fn function_selector(input: &str) -> Option<[u8; 4]> {
    let bytes = parse_hex_bytes(input).ok()?;
    if bytes.len() < 4 {
        return None;
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&bytes[..4]);
    Some(selector)
}
