use crate::decode::event::{decode_proof_set_created, decode_proof_set_owner_changed};
use crate::decode::DecodedLog;
use crate::error::IndexerError;
use crate::handlers::clamp_sub;
use crate::handlers::context::HandlerContext;
use crate::store::{PutProofSet, PutProvider};

pub(crate) async fn provider_snapshot(
    ctx: &HandlerContext<'_>,
    address: &str,
) -> Result<PutProvider, IndexerError> {
    let existing = ctx.store.find_provider_latest(address).await?;
    Ok(match existing {
        Some(row) => PutProvider {
            address: row.address,
            total_faulted_periods: row.total_faulted_periods,
            total_data_size: row.total_data_size,
            proof_set_ids: row.proof_set_ids,
            block_number: ctx.block_number,
            block_hash: ctx.block_hash.clone(),
        },
        None => PutProvider {
            address: address.to_owned(),
            total_faulted_periods: 0,
            total_data_size: 0,
            proof_set_ids: Vec::new(),
            block_number: ctx.block_number,
            block_hash: ctx.block_hash.clone(),
        },
    })
}

/// Creates the ProofSet's first version and registers it against its owner's
/// Provider. `listener_addr` isn't carried by the event, so it defaults to
/// the emitting contract's address.
pub async fn proof_set_created(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_proof_set_created(log)?;
    let set_id = event.setId.to::<u64>() as i64;
    let owner = event.owner.to_string();

    ctx.store
        .put_proof_set(PutProofSet {
            set_id,
            owner: owner.clone(),
            listener_addr: ctx.contract_address.clone(),
            is_active: true,
            challenge_range: 0,
            next_challenge_epoch: 0,
            last_proven_epoch: 0,
            total_roots: 0,
            total_proved_roots: 0,
            total_data_size: 0,
            total_fee_paid: 0,
            total_faulted_periods: 0,
            block_number: ctx.block_number,
            block_hash: ctx.block_hash.clone(),
        })
        .await?;

    let mut provider = provider_snapshot(ctx, &owner).await?;
    if !provider.proof_set_ids.contains(&set_id) {
        provider.proof_set_ids.push(set_id);
    }
    ctx.store.put_provider(provider).await?;
    Ok(())
}

/// Versions the ProofSet under its new owner and moves `total_data_size`
/// from the old Provider to the new one, clamped at zero.
pub async fn proof_set_owner_changed(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_proof_set_owner_changed(log)?;
    let set_id = event.setId.to::<u64>() as i64;
    let old_owner = event.oldOwner.to_string();
    let new_owner = event.newOwner.to_string();

    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!(
            "ProofSetOwnerChanged for unknown set {set_id}"
        )));
    };
    let moved_size = current.total_data_size;

    ctx.store
        .put_proof_set(PutProofSet {
            set_id,
            owner: new_owner.clone(),
            listener_addr: current.listener_addr,
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
        })
        .await?;

    if old_owner != new_owner {
        let mut old_provider = provider_snapshot(ctx, &old_owner).await?;
        old_provider.proof_set_ids.retain(|id| *id != set_id);
        old_provider.total_data_size = clamp_sub(old_provider.total_data_size, moved_size);
        ctx.store.put_provider(old_provider).await?;

        let mut new_provider = provider_snapshot(ctx, &new_owner).await?;
        if !new_provider.proof_set_ids.contains(&set_id) {
            new_provider.proof_set_ids.push(set_id);
        }
        new_provider.total_data_size += moved_size;
        ctx.store.put_provider(new_provider).await?;
    }

    Ok(())
}
