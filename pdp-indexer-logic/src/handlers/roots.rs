use crate::decode::event::{decode_add_roots_call, decode_roots_added_event, decode_roots_removed_event};
use crate::decode::{decode_cid, DecodedLog};
use crate::error::IndexerError;
use crate::handlers::clamp_sub;
use crate::handlers::context::HandlerContext;
use crate::handlers::proof_set::provider_snapshot;
use crate::store::PutRoot;

/// `RootsAdded(setId, rootIds)` carries only IDs; the CID and size for each
/// root live in the enclosing `addRoots` call's `RootData[]`, matched
/// positionally against the event's `rootIds`.
pub async fn roots_added(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_roots_added_event(log)?;
    let call = decode_add_roots_call(&ctx.tx_input)?;

    if event.rootIds.len() != call.rootData.len() {
        return Err(IndexerError::Decode(format!(
            "RootsAdded: event carries {} root ids but input carries {} RootData entries",
            event.rootIds.len(),
            call.rootData.len()
        )));
    }

    let set_id = event.setId.to::<u64>() as i64;
    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!("RootsAdded for unknown set {set_id}")));
    };

    let mut added_size: i64 = 0;
    for (root_id, data) in event.rootIds.iter().zip(call.rootData.iter()) {
        let cid = decode_cid(&data.root.data)?;
        let raw_size = data.rawSize.to::<u64>() as i64;
        added_size += raw_size;

        ctx.store
            .put_root(PutRoot {
                set_id,
                root_id: root_id.to::<u64>() as i64,
                raw_size,
                cid,
                removed: false,
                total_proofs_submitted: 0,
                total_periods_faulted: 0,
                last_proven_epoch: 0,
                last_faulted_epoch: 0,
                block_number: ctx.block_number,
                block_hash: ctx.block_hash.clone(),
            })
            .await?;
    }

    let mut proof_set = super::as_put_proof_set(&current, ctx);
    proof_set.total_roots += event.rootIds.len() as i64;
    proof_set.total_data_size += added_size;
    ctx.store.put_proof_set(proof_set).await?;

    let mut provider = provider_snapshot(ctx, &current.owner).await?;
    provider.total_data_size += added_size;
    ctx.store.put_provider(provider).await?;

    Ok(())
}

/// `RootsRemoved(setId, rootIds)` marks each Root removed and subtracts its
/// size from both the ProofSet and the owning Provider, clamped at zero.
pub async fn roots_removed(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_roots_removed_event(log)?;
    let set_id = event.setId.to::<u64>() as i64;

    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!("RootsRemoved for unknown set {set_id}")));
    };

    let mut removed_size: i64 = 0;
    for root_id in &event.rootIds {
        let root_id = root_id.to::<u64>() as i64;
        let Some(root) = ctx.store.find_root_latest(set_id, root_id).await? else {
            continue;
        };
        if root.removed {
            continue;
        }
        removed_size += root.raw_size;

        ctx.store
            .put_root(PutRoot {
                set_id,
                root_id,
                raw_size: root.raw_size,
                cid: root.cid,
                removed: true,
                total_proofs_submitted: root.total_proofs_submitted,
                total_periods_faulted: root.total_periods_faulted,
                last_proven_epoch: root.last_proven_epoch,
                last_faulted_epoch: root.last_faulted_epoch,
                block_number: ctx.block_number,
                block_hash: ctx.block_hash.clone(),
            })
            .await?;
    }

    let mut proof_set = super::as_put_proof_set(&current, ctx);
    proof_set.total_roots = clamp_sub(proof_set.total_roots, event.rootIds.len() as i64);
    proof_set.total_data_size = clamp_sub(proof_set.total_data_size, removed_size);
    ctx.store.put_proof_set(proof_set).await?;

    let mut provider = provider_snapshot(ctx, &current.owner).await?;
    provider.total_data_size = clamp_sub(provider.total_data_size, removed_size);
    ctx.store.put_provider(provider).await?;

    Ok(())
}
