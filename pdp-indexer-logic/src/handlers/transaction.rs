use crate::decode::event::{decode_add_roots_call, decode_next_proving_period_call, decode_prove_possession_call};
use crate::decode::DecodedTransaction;
use crate::error::IndexerError;
use crate::handlers::context::HandlerContext;
use crate::store::NewTransaction;

/// `setId` lives at a different field offset in every tracked function's
/// calldata, so it's recovered by trying each known call shape rather than
/// threading a selector table through here.
fn resolve_proof_set(input: &str) -> (i64, &'static str) {
    if let Ok(call) = decode_add_roots_call(input) {
        return (call.setId.to::<u64>() as i64, "addRoots");
    }
    if let Ok(call) = decode_prove_possession_call(input) {
        return (call.setId.to::<u64>() as i64, "provePossession");
    }
    if let Ok(call) = decode_next_proving_period_call(input) {
        return (call.setId.to::<u64>() as i64, "nextProvingPeriod");
    }
    (0, "unknown")
}

/// Logs the raw `Transaction` row for any dispatched function call, the way
/// the teacher's catch-all handler records a row before entity-specific
/// handlers run. Always the first handler invoked for a transaction.
pub async fn transaction(
    ctx: &HandlerContext<'_>,
    tx: &DecodedTransaction,
    status: bool,
    message_cid: &str,
) -> Result<(), IndexerError> {
    let (proof_set_id, method) = resolve_proof_set(&tx.input);

    ctx.store
        .append_transaction(NewTransaction {
            hash: tx.hash.clone(),
            proof_set_id,
            method: method.to_owned(),
            from: tx.from.clone(),
            to: tx.to.clone().unwrap_or_default(),
            value: tx.value.clone(),
            status: status as i16,
            height: ctx.block_number,
            message_cid: message_cid.to_owned(),
            block_number: ctx.block_number,
            block_hash: ctx.block_hash.clone(),
        })
        .await?;
    Ok(())
}
