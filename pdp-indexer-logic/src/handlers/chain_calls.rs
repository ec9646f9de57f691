//! Read-only contract views used to reproduce on-chain state the event
//! payload itself doesn't carry (the randomness seed and root resolution
//! behind a `FaultRecord`).

use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::abi::PDPVerifier;
use crate::chain_source::ChainSource;
use crate::error::IndexerError;

pub async fn get_randomness(
    rpc: &dyn ChainSource,
    contract_address: &str,
    epoch: u64,
) -> Result<[u8; 32], IndexerError> {
    let call = PDPVerifier::getRandomnessCall {
        epoch: U256::from(epoch),
    };
    let data_hex = format!("0x{}", hex::encode(call.abi_encode()));
    let raw = rpc.eth_call(contract_address, &data_hex).await?;
    let decoded = PDPVerifier::getRandomnessCall::abi_decode_returns(&raw)
        .map_err(|e| IndexerError::Decode(format!("getRandomness return: {e}")))?;
    Ok(decoded._0.to_be_bytes::<32>())
}

pub async fn find_root_ids(
    rpc: &dyn ChainSource,
    contract_address: &str,
    set_id: u64,
    leaf_indices: &[u64],
) -> Result<Vec<PDPVerifier::RootIdAndOffset>, IndexerError> {
    let call = PDPVerifier::findRootIdsCall {
        setId: U256::from(set_id),
        leafIndices: leaf_indices.iter().map(|i| U256::from(*i)).collect(),
    };
    let data_hex = format!("0x{}", hex::encode(call.abi_encode()));
    let raw = rpc.eth_call(contract_address, &data_hex).await?;
    let decoded = PDPVerifier::findRootIdsCall::abi_decode_returns(&raw)
        .map_err(|e| IndexerError::Decode(format!("findRootIds return: {e}")))?;
    Ok(decoded._0)
}
