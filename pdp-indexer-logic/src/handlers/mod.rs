pub mod chain_calls;
pub mod context;
pub mod fault;
pub mod fee;
pub mod possession;
pub mod proof_set;
pub mod proving_period;
pub mod registry;
pub mod roots;
pub mod transaction;

pub use context::HandlerContext;
pub use registry::HandlerRegistry;

use crate::decode::DecodedLog;
use crate::error::IndexerError;
use crate::store::PutProofSet;

pub(crate) fn clamp_sub(value: i64, amount: i64) -> i64 {
    (value - amount).max(0)
}

/// Carries every unversioned field of a stored ProofSet row forward into a
/// new version pinned at the handling block, so a handler only has to touch
/// the columns it actually mutates.
pub(crate) fn as_put_proof_set(
    current: &pdp_indexer_entity::proof_set::Model,
    ctx: &HandlerContext<'_>,
) -> PutProofSet {
    PutProofSet {
        set_id: current.set_id,
        owner: current.owner.clone(),
        listener_addr: current.listener_addr.clone(),
        is_active: current.is_active,
        challenge_range: current.challenge_range,
        next_challenge_epoch: current.next_challenge_epoch,
        last_proven_epoch: current.last_proven_epoch,
        total_roots: current.total_roots,
        total_proved_roots: current.total_proved_roots,
        total_data_size: current.total_data_size,
        total_fee_paid: current.total_fee_paid,
        total_faulted_periods: current.total_faulted_periods,
        block_number: ctx.block_number,
        block_hash: ctx.block_hash.clone(),
    }
}

/// Dispatches a decoded log to its named event handler. `None` means the
/// registry has no handler bound to this log's topic-0 (already filtered out
/// by the caller in practice, but kept defensive).
pub async fn dispatch_event(
    handler: &str,
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    match handler {
        "proof_set_created" => proof_set::proof_set_created(ctx, log).await,
        "proof_set_owner_changed" => proof_set::proof_set_owner_changed(ctx, log).await,
        "roots_added" => roots::roots_added(ctx, log).await,
        "roots_removed" => roots::roots_removed(ctx, log).await,
        "possession_proven" => possession::possession_proven(ctx, log).await,
        "next_proving_period" => proving_period::next_proving_period(ctx, log).await,
        "fault_record" => fault::fault_record(ctx, log).await,
        "proof_fee_paid" => fee::proof_fee_paid(ctx, log).await,
        "proof_set_empty" => proving_period::proof_set_empty(ctx, log).await,
        other => Err(IndexerError::Decode(format!("no event handler named `{other}`"))),
    }
}

/// Dispatches the function-call side: currently every manifest-bound
/// function trigger resolves to the same catch-all row logger.
pub async fn dispatch_function(
    handler: &str,
    ctx: &HandlerContext<'_>,
    tx: &crate::decode::DecodedTransaction,
    status: bool,
    message_cid: &str,
) -> Result<(), IndexerError> {
    match handler {
        "transaction" => transaction::transaction(ctx, tx, status, message_cid).await,
        other => Err(IndexerError::Decode(format!("no function handler named `{other}`"))),
    }
}
