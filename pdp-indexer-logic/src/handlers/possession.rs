use crate::decode::event::{decode_possession_proven_event, decode_prove_possession_call};
use crate::decode::DecodedLog;
use crate::error::IndexerError;
use crate::handlers::context::HandlerContext;
use crate::store::{NewProof, PutRoot};

fn flatten_proof(siblings: &[alloy::primitives::B256]) -> Vec<u8> {
    siblings.iter().flat_map(|h| h.0).collect()
}

/// `PossessionProven(setId, challenges)` names which (root, offset) pairs
/// were challenged; the corresponding Merkle proofs live positionally in the
/// enclosing `provePossession` call's `Proof[]`.
pub async fn possession_proven(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_possession_proven_event(log)?;
    let call = decode_prove_possession_call(&ctx.tx_input)?;

    if event.challenges.len() != call.proofs.len() {
        return Err(IndexerError::Decode(format!(
            "PossessionProven: {} challenges but {} proofs",
            event.challenges.len(),
            call.proofs.len()
        )));
    }

    let set_id = event.setId.to::<u64>() as i64;
    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!("PossessionProven for unknown set {set_id}")));
    };

    for (challenge, proof) in event.challenges.iter().zip(call.proofs.iter()) {
        let root_id = challenge.rootId.to::<u64>() as i64;

        ctx.store
            .append_proof(NewProof {
                set_id,
                root_id,
                proof_offset: challenge.offset.to::<u64>() as i64,
                leaf_hash: proof.leaf.0.to_vec(),
                merkle_proof: flatten_proof(&proof.proof),
                proven_at: ctx.block_number,
                block_number: ctx.block_number,
                block_hash: ctx.block_hash.clone(),
            })
            .await?;

        if let Some(root) = ctx.store.find_root_latest(set_id, root_id).await? {
            ctx.store
                .put_root(PutRoot {
                    set_id,
                    root_id,
                    raw_size: root.raw_size,
                    cid: root.cid,
                    removed: root.removed,
                    total_proofs_submitted: root.total_proofs_submitted + 1,
                    total_periods_faulted: root.total_periods_faulted,
                    last_proven_epoch: ctx.block_number,
                    last_faulted_epoch: root.last_faulted_epoch,
                    block_number: ctx.block_number,
                    block_hash: ctx.block_hash.clone(),
                })
                .await?;
        }
    }

    let mut proof_set = super::as_put_proof_set(&current, ctx);
    proof_set.total_proved_roots += event.challenges.len() as i64;
    proof_set.last_proven_epoch = ctx.block_number;
    ctx.store.put_proof_set(proof_set).await?;

    Ok(())
}
