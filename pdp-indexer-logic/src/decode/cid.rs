use cid::Cid;

use crate::error::IndexerError;

/// Decodes a Root's `root.data` bytes (the raw, binary-encoded CID from the
/// `Cids.Cid` Solidity struct) and renders it back to its default string
/// form for storage. Validates only well-formedness of the CID itself, not
/// what it points to — that is outside the ingest engine's scope.
pub fn decode_cid(data: &[u8]) -> Result<String, IndexerError> {
    let cid = Cid::try_from(data).map_err(|e| IndexerError::Decode(format!("bad cid: {e}")))?;
    Ok(cid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_cidv1_raw_binary() {
        let cid = Cid::try_from("bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof3k3i").unwrap();
        let bytes = cid.to_bytes();
        let decoded = decode_cid(&bytes).unwrap();
        assert_eq!(decoded, cid.to_string());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_cid(&[0xff, 0x00]).is_err());
    }
}
