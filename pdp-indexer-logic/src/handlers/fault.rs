use itertools::Itertools;

use crate::decode::challenge::challenge_leaf_indices;
use crate::decode::event::{decode_fault_record_event, decode_next_proving_period_call};
use crate::decode::DecodedLog;
use crate::error::IndexerError;
use crate::handlers::chain_calls::{find_root_ids, get_randomness};
use crate::handlers::context::HandlerContext;
use crate::handlers::proof_set::provider_snapshot;
use crate::settings::NUM_CHALLENGES;
use crate::store::{NewFaultRecord, PutRoot};

/// Reproduces the deterministic challenge selection behind a `FaultRecord`:
/// the current challenge epoch's randomness, resolved to leaf indices, then
/// to root IDs via the contract's own `findRootIds` view. `next_challenge_epoch`
/// isn't in the event; it's read from the enclosing `nextProvingPeriod` call
/// that accompanies every fault in the same transaction.
pub async fn fault_record(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_fault_record_event(log)?;
    let set_id = event.setId.to::<u64>() as i64;

    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!("FaultRecord for unknown set {set_id}")));
    };

    let current_challenge_epoch = current.next_challenge_epoch;
    let total_leaves = current.challenge_range.max(0) as u64;

    let seed = get_randomness(ctx.rpc, &ctx.contract_address, current_challenge_epoch as u64).await?;
    let leaf_indices = if total_leaves == 0 {
        Vec::new()
    } else {
        challenge_leaf_indices(seed, set_id as u64, NUM_CHALLENGES, total_leaves)
    };

    let resolved = if leaf_indices.is_empty() {
        Vec::new()
    } else {
        find_root_ids(ctx.rpc, &ctx.contract_address, set_id as u64, &leaf_indices).await?
    };

    let root_ids: Vec<i64> = resolved
        .iter()
        .map(|r| r.rootId.to::<u64>() as i64)
        .unique()
        .collect();

    for &root_id in &root_ids {
        if let Some(root) = ctx.store.find_root_latest(set_id, root_id).await? {
            ctx.store
                .put_root(PutRoot {
                    set_id,
                    root_id,
                    raw_size: root.raw_size,
                    cid: root.cid,
                    removed: root.removed,
                    total_proofs_submitted: root.total_proofs_submitted,
                    total_periods_faulted: root.total_periods_faulted + 1,
                    last_proven_epoch: root.last_proven_epoch,
                    last_faulted_epoch: ctx.block_number,
                    block_number: ctx.block_number,
                    block_hash: ctx.block_hash.clone(),
                })
                .await?;
        }
    }

    let next_challenge_epoch = decode_next_proving_period_call(&ctx.tx_input)
        .map(|call| call.challengeEpoch.to::<u64>() as i64)
        .unwrap_or(current_challenge_epoch);

    let periods_faulted = event.periodsFaulted.to::<u64>() as i64;

    ctx.store
        .append_fault_record(NewFaultRecord {
            set_id,
            root_ids,
            current_challenge_epoch,
            next_challenge_epoch,
            periods_faulted,
            deadline: event.deadline.to::<u64>() as i64,
            block_number: ctx.block_number,
            block_hash: ctx.block_hash.clone(),
        })
        .await?;

    let mut proof_set = super::as_put_proof_set(&current, ctx);
    proof_set.total_faulted_periods += periods_faulted;
    ctx.store.put_proof_set(proof_set).await?;

    let mut provider = provider_snapshot(ctx, &current.owner).await?;
    provider.total_faulted_periods += periods_faulted;
    ctx.store.put_provider(provider).await?;

    Ok(())
}
