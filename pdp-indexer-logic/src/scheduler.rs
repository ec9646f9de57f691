//! Scheduler (C9): resolves where to start, runs the recovery loop up to
//! the chain tip in bounded batches, then settles into a poll loop that
//! keeps pace with new blocks.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chain_source::ChainSource;
use crate::handlers::HandlerRegistry;
use crate::reorg::ReorgController;
use crate::settings::SchedulerSettings;
use crate::store::Store;
use crate::tipset::process_block;

pub struct Scheduler {
    store: Store,
    rpc: Arc<dyn ChainSource>,
    registry: HandlerRegistry,
    reorg: ReorgController,
    settings: SchedulerSettings,
    start_block: u64,
}

/// Pure cursor-resolution rule, pulled out of `Scheduler::resolve_cursor` so
/// it's testable without a database: one past the highest processed block,
/// or the configured start height, whichever is higher. `None` means
/// neither has ever been set, and the caller should fall back to the chain
/// tip instead.
fn resume_height(last_processed: i64, start_block: u64) -> Option<u64> {
    if last_processed == 0 && start_block == 0 {
        return None;
    }
    Some((last_processed as u64 + 1).max(start_block))
}

impl Scheduler {
    pub fn new(
        store: Store,
        rpc: Arc<dyn ChainSource>,
        registry: HandlerRegistry,
        reorg: ReorgController,
        settings: SchedulerSettings,
        start_block: u64,
    ) -> Self {
        Self {
            store,
            rpc,
            registry,
            reorg,
            settings,
            start_block,
        }
    }

    async fn resolve_cursor(&self) -> anyhow::Result<u64> {
        let last_processed = self.store.get_last_processed_block().await?;
        match resume_height(last_processed, self.start_block) {
            Some(height) => Ok(height),
            None => Ok(self.rpc.tip_height().await?),
        }
    }

    async fn process_height(&self, height: u64) -> anyhow::Result<()> {
        match self.rpc.block_by_height(height).await? {
            Some(block) => {
                process_block(
                    &self.store,
                    self.rpc.as_ref(),
                    &self.registry,
                    &self.reorg,
                    block,
                )
                .await
            }
            None => {
                warn!(height, "null round, skipping");
                Ok(())
            }
        }
    }

    /// Runs until `cancel` fires. Covers both the initial recovery (catching
    /// up from the resolved cursor to the tip at startup) and the steady
    /// poll loop, since they're the same chunk-and-advance logic with a
    /// sleep once there's nothing left to catch up on.
    pub async fn run(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let mut cursor = self.resolve_cursor().await?;
        info!(cursor, "scheduler starting");

        loop {
            if cancel.is_cancelled() {
                info!("scheduler stopping");
                return Ok(());
            }

            let tip = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("scheduler stopping before tip fetch");
                    return Ok(());
                }
                result = self.rpc.tip_height() => result?,
            };

            if cursor > tip {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("scheduler stopping before poll sleep");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(self.settings.min_poll_interval) => {}
                }
                continue;
            }

            let batch_end = tip.min(cursor + self.settings.max_batch - 1);
            for height in cursor..=batch_end {
                if cancel.is_cancelled() {
                    info!(height, "scheduler stopping mid-batch");
                    return Ok(());
                }
                self.process_height(height).await?;
                cursor = height + 1;
            }

            if cursor <= tip {
                // still behind after a full batch; loop straight back in
                // without sleeping.
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("scheduler stopping after catching up");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.settings.min_poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_falls_back_to_tip() {
        assert_eq!(resume_height(0, 0), None);
    }

    #[test]
    fn configured_start_wins_over_genesis() {
        assert_eq!(resume_height(0, 200), Some(200));
    }

    #[test]
    fn resumes_one_past_last_processed() {
        assert_eq!(resume_height(1000, 0), Some(1001));
    }

    #[test]
    fn configured_start_does_not_rewind_past_progress() {
        assert_eq!(resume_height(1000, 5), Some(1001));
    }
}
