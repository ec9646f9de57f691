//! Reorg Controller (C8): detects a divergence between the chain the Tipset
//! Processor is about to process and what's already stored, then reconciles
//! it by deleting the affected range and replaying it inside one transaction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::chain_source::ChainSource;
use crate::error::IndexerError;
use crate::handlers::HandlerRegistry;
use crate::settings::{REORG_DEPTH_CAP, REORG_RECONCILIATION_DEADLINE};
use crate::store::{BlockStore, Store, StoreTx};
use crate::tipset::process_block_body;

struct ActiveReorg {
    start_height: i64,
    end_height: i64,
    started_at: Instant,
}

impl ActiveReorg {
    fn overlaps(&self, start: i64, end: i64) -> bool {
        self.start_height <= end && start <= self.end_height
    }

    fn expired(&self) -> bool {
        self.started_at.elapsed() > REORG_RECONCILIATION_DEADLINE
    }
}

/// Tracks in-flight reconciliations so two overlapping reorgs never race
/// each other's `delete_reorged` + replay against the same rows. Keyed by
/// `start_height` purely for readability; lookups are always a full scan
/// since the map holds at most a handful of entries at any time.
#[derive(Clone, Default)]
pub struct ReorgController {
    active: Arc<Mutex<HashMap<i64, ActiveReorg>>>,
}

impl ReorgController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(true)` if this block was already handled by this call
    /// (either reconciled, or skipped because an overlapping reorg is
    /// already in flight) and the caller should stop processing it as a
    /// normal block. Returns `Ok(false)` if no divergence was found.
    pub async fn handle_if_diverged(
        &self,
        store: &Store,
        rpc: &dyn ChainSource,
        registry: &HandlerRegistry,
        height: i64,
        incoming_parent_hash: &str,
    ) -> anyhow::Result<bool> {
        let Some(stored_parent) = store.get_block_by_height(height - 1).await? else {
            return Ok(false);
        };
        if stored_parent.hash == incoming_parent_hash {
            return Ok(false);
        }

        let depth = find_fork_depth(store, rpc, height - 1).await?;
        // `depth` counts mismatches walked from `height - 1` down to (but
        // not including) the last-agreeing height — the common ancestor
        // itself must not be deleted and replayed, only what's forked above
        // it, i.e. the `depth` heights below `height` plus `height` itself.
        let start_height = height - depth;
        let end_height = height;

        if !self.reserve(start_height, end_height) {
            warn!(
                start_height,
                end_height, "skipping reorg, an overlapping reconciliation is already in flight"
            );
            return Ok(true);
        }

        info!(start_height, end_height, depth, "reorg detected, reconciling");
        let result = self.reconcile(store, rpc, registry, start_height, end_height).await;
        self.release(start_height);
        result?;
        Ok(true)
    }

    /// Registers `[start, end]` as in-flight unless it overlaps an existing
    /// entry, first evicting any entry past its reconciliation deadline.
    fn reserve(&self, start_height: i64, end_height: i64) -> bool {
        let mut active = self.active.lock();
        active.retain(|_, r| !r.expired());

        if active.values().any(|r| r.overlaps(start_height, end_height)) {
            return false;
        }

        active.insert(
            start_height,
            ActiveReorg {
                start_height,
                end_height,
                started_at: Instant::now(),
            },
        );
        true
    }

    fn release(&self, start_height: i64) {
        self.active.lock().remove(&start_height);
    }

    async fn reconcile(
        &self,
        store: &Store,
        rpc: &dyn ChainSource,
        registry: &HandlerRegistry,
        start_height: i64,
        end_height: i64,
    ) -> anyhow::Result<()> {
        let deadline = Instant::now() + REORG_RECONCILIATION_DEADLINE;
        let tx = store.begin_tx().await?;
        let store_tx = StoreTx::new(&tx);

        store_tx.delete_reorged(start_height, end_height).await?;

        for raw_height in start_height..=end_height {
            if Instant::now() > deadline {
                return Err(IndexerError::ReorgDeadlineExceeded.into());
            }

            let height = raw_height as u64;
            let Some(block) = rpc.block_by_height(height).await? else {
                warn!(height, "reorg replay hit a null round, skipping");
                continue;
            };
            process_block_body(&store_tx, rpc, registry, &block).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Walks backward from `start_height`, comparing the locally stored hash at
/// each height against the chain's canonical hash, until they match. Returns
/// the number of heights walked past the point they last agreed (a null
/// round along the way still consumes depth; it just can't be compared).
async fn find_fork_depth(
    store: &Store,
    rpc: &dyn ChainSource,
    start_height: i64,
) -> Result<i64, IndexerError> {
    let mut depth: i64 = 0;
    let mut height = start_height;

    loop {
        if depth as u64 > REORG_DEPTH_CAP {
            return Err(IndexerError::ReorgDepth { depth: depth as u64 });
        }

        let Some(stored) = store.get_block_by_height(height).await? else {
            return Ok(depth);
        };

        match rpc.block_by_height(height as u64).await? {
            Some(canonical) if canonical.hash == stored.hash => return Ok(depth),
            _ => {
                depth += 1;
                height -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_detects_shared_heights() {
        let a = ActiveReorg {
            start_height: 10,
            end_height: 20,
            started_at: Instant::now(),
        };
        assert!(a.overlaps(15, 25));
        assert!(a.overlaps(5, 10));
        assert!(!a.overlaps(21, 30));
        assert!(!a.overlaps(0, 9));
    }

    #[test]
    fn reserve_rejects_overlap_and_frees_on_release() {
        let ctrl = ReorgController::new();
        assert!(ctrl.reserve(100, 110));
        assert!(!ctrl.reserve(105, 120));
        ctrl.release(100);
        assert!(ctrl.reserve(105, 120));
    }
}
