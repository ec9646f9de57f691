//! A scriptable `ChainSource` stand-in for tests that need to drive the
//! Tipset Processor and Reorg Controller against a canned chain instead of
//! a live Lotus node, the way the teacher's `test_utils::create_test_node`
//! stands in for a real RPC node.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::chain_source::ChainSource;
use crate::decode::{DecodedBlock, DecodedReceipt, DecodedTransaction};
use crate::error::IndexerError;

/// Builds a `DecodedBlock` with no transactions, which is all the scenario
/// tests need since they exercise block/reorg bookkeeping, not handlers.
pub fn stub_block(height: u64, hash: &str, parent_hash: &str) -> DecodedBlock {
    DecodedBlock {
        height,
        hash: hash.to_owned(),
        parent_hash: parent_hash.to_owned(),
        timestamp: height * 30,
        transactions: Vec::new(),
    }
}

pub fn stub_block_with_txs(
    height: u64,
    hash: &str,
    parent_hash: &str,
    transactions: Vec<DecodedTransaction>,
) -> DecodedBlock {
    DecodedBlock {
        transactions,
        ..stub_block(height, hash, parent_hash)
    }
}

/// A `ChainSource` whose responses are scripted ahead of time. Heights with
/// no scripted block answer `None` (a null round), the same as a live node.
#[derive(Default)]
pub struct StubChainSource {
    blocks: Mutex<HashMap<u64, DecodedBlock>>,
    receipts: Mutex<HashMap<String, (DecodedReceipt, String)>>,
    delays: Mutex<HashMap<u64, Duration>>,
    tip: Mutex<u64>,
}

impl StubChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(self, block: DecodedBlock) -> Self {
        let height = block.height;
        self.blocks.lock().unwrap().insert(height, block);
        self.set_tip(height);
        self
    }

    pub fn with_receipt(self, tx_hash: &str, receipt: DecodedReceipt, message_cid: &str) -> Self {
        self.receipts
            .lock()
            .unwrap()
            .insert(tx_hash.to_owned(), (receipt, message_cid.to_owned()));
        self
    }

    pub fn set_tip(&self, height: u64) {
        let mut tip = self.tip.lock().unwrap();
        if height > *tip {
            *tip = height;
        }
    }

    /// Makes `block_by_height(height)` wait before answering, so tests can
    /// force two reconciliations to overlap in time without needing real
    /// network jitter.
    pub fn with_delay(self, height: u64, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(height, delay);
        self
    }
}

#[async_trait]
impl ChainSource for StubChainSource {
    async fn tip_height(&self) -> Result<u64, IndexerError> {
        Ok(*self.tip.lock().unwrap())
    }

    async fn block_by_height(&self, height: u64) -> Result<Option<DecodedBlock>, IndexerError> {
        let delay = self.delays.lock().unwrap().get(&height).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.blocks.lock().unwrap().get(&height).cloned())
    }

    async fn receipt_and_message_cid(
        &self,
        tx_hash: &str,
    ) -> Result<Option<(DecodedReceipt, String)>, IndexerError> {
        Ok(self.receipts.lock().unwrap().get(tx_hash).cloned())
    }

    async fn eth_call(&self, _to: &str, _data_hex: &str) -> Result<Vec<u8>, IndexerError> {
        Ok(Vec::new())
    }
}
