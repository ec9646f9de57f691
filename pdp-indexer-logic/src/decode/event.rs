use alloy::primitives::B256;
use alloy::sol_types::{SolCall, SolEvent};

use crate::abi::PDPVerifier;
use crate::decode::receipt::DecodedLog;
use crate::error::IndexerError;

fn topics_as_b256(log: &DecodedLog) -> Result<Vec<B256>, IndexerError> {
    log.topics
        .iter()
        .map(|t| {
            let bytes = crate::decode::parse_hex_bytes(t)?;
            B256::try_from(bytes.as_slice())
                .map_err(|_| IndexerError::Decode(format!("topic `{t}` is not 32 bytes")))
        })
        .collect()
}

macro_rules! decode_event {
    ($name:ident, $ty:path) => {
        pub fn $name(log: &DecodedLog) -> Result<$ty, IndexerError> {
            let topics = topics_as_b256(log)?;
            <$ty as SolEvent>::decode_raw_log(topics, &log.data)
                .map_err(|e| IndexerError::Decode(format!(concat!(stringify!($ty), ": {}"), e)))
        }
    };
}

decode_event!(decode_proof_set_created, PDPVerifier::ProofSetCreated);
decode_event!(decode_proof_set_owner_changed, PDPVerifier::ProofSetOwnerChanged);
decode_event!(decode_roots_added_event, PDPVerifier::RootsAdded);
decode_event!(decode_roots_removed_event, PDPVerifier::RootsRemoved);
decode_event!(decode_possession_proven_event, PDPVerifier::PossessionProven);
decode_event!(decode_next_proving_period_event, PDPVerifier::NextProvingPeriod);
decode_event!(decode_fault_record_event, PDPVerifier::FaultRecord);
decode_event!(decode_proof_fee_paid_event, PDPVerifier::ProofFeePaid);
decode_event!(decode_proof_set_empty_event, PDPVerifier::ProofSetEmpty);

/// Decodes the full calldata (selector + arguments) of a tracked function
/// call. `input` is the `0x`-prefixed hex transaction input.
pub fn decode_call<C: SolCall>(input: &str) -> Result<C, IndexerError> {
    let bytes = crate::decode::parse_hex_bytes(input)?;
    C::abi_decode(&bytes).map_err(|e| IndexerError::Decode(format!("call decode: {e}")))
}

pub fn decode_add_roots_call(input: &str) -> Result<PDPVerifier::addRootsCall, IndexerError> {
    decode_call(input)
}

pub fn decode_prove_possession_call(
    input: &str,
) -> Result<PDPVerifier::provePossessionCall, IndexerError> {
    decode_call(input)
}

pub fn decode_next_proving_period_call(
    input: &str,
) -> Result<PDPVerifier::nextProvingPeriodCall, IndexerError> {
    decode_call(input)
}
