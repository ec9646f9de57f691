use crate::decode::event::{decode_next_proving_period_event, decode_proof_set_empty_event};
use crate::decode::DecodedLog;
use crate::error::IndexerError;
use crate::handlers::context::HandlerContext;

pub async fn next_proving_period(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_next_proving_period_event(log)?;
    let set_id = event.setId.to::<u64>() as i64;

    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!(
            "NextProvingPeriod for unknown set {set_id}"
        )));
    };

    let mut proof_set = super::as_put_proof_set(&current, ctx);
    proof_set.next_challenge_epoch = event.nextChallengeEpoch.to::<u64>() as i64;
    proof_set.challenge_range = event.leafCount.to::<u64>() as i64;
    ctx.store.put_proof_set(proof_set).await?;
    Ok(())
}

pub async fn proof_set_empty(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_proof_set_empty_event(log)?;
    let set_id = event.setId.to::<u64>() as i64;

    let Some(current) = ctx.store.find_proof_set_latest(set_id).await? else {
        return Err(IndexerError::Decode(format!("ProofSetEmpty for unknown set {set_id}")));
    };

    let mut proof_set = super::as_put_proof_set(&current, ctx);
    proof_set.total_roots = 0;
    proof_set.total_data_size = 0;
    proof_set.last_proven_epoch = 0;
    proof_set.next_challenge_epoch = 0;
    ctx.store.put_proof_set(proof_set).await?;
    Ok(())
}
