use crate::decode::event::decode_proof_fee_paid_event;
use crate::decode::DecodedLog;
use crate::error::IndexerError;
use crate::handlers::context::HandlerContext;
use crate::store::NewProofFee;

pub async fn proof_fee_paid(
    ctx: &HandlerContext<'_>,
    log: &DecodedLog,
) -> Result<(), IndexerError> {
    let event = decode_proof_fee_paid_event(log)?;
    let set_id = event.setId.to::<u64>() as i64;
    let fee_id = format!("{}_{:#x}", log.transaction_hash, log.log_index);

    ctx.store
        .append_proof_fee(NewProofFee {
            fee_id,
            set_id,
            proof_fee: event.fee.to::<u64>() as i64,
            fil_usd_price: event.price as i64,
            fil_usd_price_exponent: event.expo,
            block_number: ctx.block_number,
            block_hash: ctx.block_hash.clone(),
        })
        .await?;

    if let Some(current) = ctx.store.find_proof_set_latest(set_id).await? {
        let mut proof_set = super::as_put_proof_set(&current, ctx);
        proof_set.total_fee_paid += event.fee.to::<u64>() as i64;
        ctx.store.put_proof_set(proof_set).await?;
    }

    Ok(())
}
