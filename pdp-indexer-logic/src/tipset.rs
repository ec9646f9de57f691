//! Tipset Processor (C7): turns one decoded block into stored rows and
//! dispatched handler mutations.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{error, warn};

use crate::chain_source::ChainSource;
use crate::decode::{DecodedBlock, DecodedLog, DecodedReceipt, DecodedTransaction};
use crate::handlers::{dispatch_event, dispatch_function, HandlerContext, HandlerRegistry};
use crate::reorg::ReorgController;
use crate::settings::{CLEANUP_STRIDE, FINALIZATION_DEPTH, RECEIPT_FANOUT};
use crate::store::{BlockStore, NewEventLog, Store};

fn topic0_bytes(log: &DecodedLog) -> Option<alloy::primitives::B256> {
    let topic0 = log.topic0()?;
    let bytes = crate::decode::parse_hex_bytes(topic0).ok()?;
    alloy::primitives::B256::try_from(bytes.as_slice()).ok()
}

async fn fetch_receipts(
    rpc: &dyn ChainSource,
    tracked: &[&DecodedTransaction],
) -> HashMap<String, (DecodedReceipt, String)> {
    let results = stream::iter(tracked.iter().map(|tx| {
        let hash = tx.hash.clone();
        async move {
            let outcome = rpc.receipt_and_message_cid(&hash).await;
            (hash, outcome)
        }
    }))
    .buffer_unordered(RECEIPT_FANOUT)
    .collect::<Vec<_>>()
    .await;

    let mut receipts = HashMap::with_capacity(results.len());
    for (hash, outcome) in results {
        match outcome {
            Ok(Some(pair)) => {
                receipts.insert(hash, pair);
            }
            Ok(None) => warn!(tx = %hash, "receipt fetch returned a null round"),
            Err(e) => error!(tx = %hash, error = %e, "receipt fetch failed"),
        }
    }
    receipts
}

async fn dispatch_transaction<S: BlockStore>(
    store: &S,
    rpc: &dyn ChainSource,
    registry: &HandlerRegistry,
    block: &DecodedBlock,
    tx: &DecodedTransaction,
    receipt: &DecodedReceipt,
    message_cid: &str,
) {
    let contract_address = tx.to.clone().unwrap_or_default();
    let ctx = HandlerContext {
        store: store as &dyn crate::store::StoreOps,
        rpc,
        contract_address,
        tx_hash: tx.hash.clone(),
        tx_input: tx.input.clone(),
        block_number: block.height as i64,
        block_hash: block.hash.clone(),
    };

    if let Some(selector) = crate::decode::function_selector(&tx.input) {
        if let Some(handler) = registry.handler_for_selector(&selector) {
            if let Err(e) =
                dispatch_function(handler, &ctx, tx, receipt.status, message_cid).await
            {
                error!(tx = %tx.hash, handler, error = %e, "function handler failed");
            }
        }
    }

    let mut logs = receipt.logs.clone();
    logs.sort_by_key(|log| log.log_index);

    for log in &logs {
        let Some(topic0) = topic0_bytes(log) else {
            continue;
        };
        let Some(handler) = registry.handler_for_topic0(&topic0) else {
            continue;
        };

        if let Err(e) = store
            .append_event_log(NewEventLog {
                tx_hash: tx.hash.clone(),
                log_index: log.log_index as i64,
                address: log.address.clone(),
                topic0: log.topic0().unwrap_or_default().to_owned(),
                data: log.data.clone(),
                block_number: block.height as i64,
                block_hash: block.hash.clone(),
                removed: log.removed,
            })
            .await
        {
            error!(tx = %tx.hash, log_index = log.log_index, error = %e, "failed to append event log");
            continue;
        }

        if let Err(e) = dispatch_event(handler, &ctx, log).await {
            error!(tx = %tx.hash, log_index = log.log_index, handler, error = %e, "event handler failed");
        }
    }
}

/// Processes a single already-fetched, non-reorged block: collects tracked
/// transactions, fans out their receipts, dispatches handlers, marks the
/// block processed, and opportunistically cleans up finalized history.
pub async fn process_transactions<S: BlockStore>(
    store: &S,
    rpc: &dyn ChainSource,
    registry: &HandlerRegistry,
    block: &DecodedBlock,
) {
    let tracked: Vec<&DecodedTransaction> = block
        .transactions
        .iter()
        .filter(|tx| {
            tx.to
                .as_deref()
                .map(|to| registry.is_tracked_address(to))
                .unwrap_or(false)
        })
        .collect();

    if tracked.is_empty() {
        return;
    }

    let receipts = fetch_receipts(rpc, &tracked).await;

    for tx in tracked {
        let Some((receipt, message_cid)) = receipts.get(&tx.hash) else {
            continue;
        };
        dispatch_transaction(store, rpc, registry, block, tx, receipt, message_cid).await;
    }
}

/// Steps 1 and 3-6 of the per-block pipeline: upsert the block row, dispatch
/// every tracked transaction, then mark the block processed. Shared between
/// normal processing (against the pooled `Store`) and reorg replay (against
/// a `StoreTx` bound to the reconciliation transaction) — step 2 (divergence
/// detection) and step 7 (finalized cleanup) only make sense at the former's
/// call site, so they're not part of this body.
pub async fn process_block_body<S: BlockStore>(
    store: &S,
    rpc: &dyn ChainSource,
    registry: &HandlerRegistry,
    block: &DecodedBlock,
) -> anyhow::Result<()> {
    store
        .save_block(
            block.height as i64,
            &block.hash,
            &block.parent_hash,
            block.timestamp as i64,
        )
        .await?;

    process_transactions(store, rpc, registry, block).await;

    store.mark_block_processed(block.height as i64).await?;

    Ok(())
}

/// Runs the full per-block pipeline from spec step 1 through step 7. Returns
/// once the block (or its triggered reorg) has been fully handled.
pub async fn process_block(
    store: &Store,
    rpc: &dyn ChainSource,
    registry: &HandlerRegistry,
    reorg: &ReorgController,
    block: DecodedBlock,
) -> anyhow::Result<()> {
    if reorg
        .handle_if_diverged(store, rpc, registry, block.height as i64, &block.parent_hash)
        .await?
    {
        return Ok(());
    }

    process_block_body(store, rpc, registry, &block).await?;

    let height = block.height as i64;
    if height % CLEANUP_STRIDE == 0 && height >= FINALIZATION_DEPTH {
        if let Err(e) = store.cleanup_finalized(height).await {
            error!(height, error = %e, "cleanup_finalized failed");
        }
    }

    Ok(())
}
