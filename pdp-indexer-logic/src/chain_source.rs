//! The chain-facing interface the Tipset Processor, Reorg Controller, and
//! Handlers all consume. Boxed as a trait object so tests can swap in a
//! scripted stub without threading a generic parameter through every
//! component, the way the teacher's `indexer` module depends on a
//! `Box<dyn AvalancheClient>`-style seam rather than a concrete HTTP client.

use async_trait::async_trait;

use crate::decode::block::parse_height;
use crate::decode::{decode_block, decode_receipt, parse_hex_bytes, DecodedBlock, DecodedReceipt};
use crate::error::IndexerError;
use crate::rpc::{call_with_retry, RpcClient, RpcOutcome};

#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn tip_height(&self) -> Result<u64, IndexerError>;

    /// `None` means the height was a null round.
    async fn block_by_height(&self, height: u64) -> Result<Option<DecodedBlock>, IndexerError>;

    /// `None` means the transaction's receipt came back as a null round
    /// (should not normally happen for an already-mined transaction, but
    /// handled the same way as every other RPC response).
    async fn receipt_and_message_cid(
        &self,
        tx_hash: &str,
    ) -> Result<Option<(DecodedReceipt, String)>, IndexerError>;

    /// Raw `eth_call` against `to`, returning the decoded return bytes.
    async fn eth_call(&self, to: &str, data_hex: &str) -> Result<Vec<u8>, IndexerError>;
}

#[async_trait]
impl ChainSource for RpcClient {
    async fn tip_height(&self) -> Result<u64, IndexerError> {
        let outcomes =
            call_with_retry(|| async { self.batch_call(&[RpcClient::block_number()]).await }).await?;
        match &outcomes[0] {
            RpcOutcome::Ok(value) => {
                let hex = value
                    .as_str()
                    .ok_or_else(|| IndexerError::Decode("tip height: non-string result".into()))?;
                parse_height(hex)
            }
            RpcOutcome::NullRound => Err(IndexerError::Decode("tip height returned null round".into())),
            RpcOutcome::Err { code, message } => Err(IndexerError::Remote {
                code: *code,
                message: message.clone(),
            }),
        }
    }

    async fn block_by_height(&self, height: u64) -> Result<Option<DecodedBlock>, IndexerError> {
        let outcomes = call_with_retry(|| async {
            self.batch_call(&[RpcClient::block_by_number(height)]).await
        })
        .await?;
        match &outcomes[0] {
            RpcOutcome::Ok(value) => Ok(Some(decode_block(value)?)),
            RpcOutcome::NullRound => Ok(None),
            RpcOutcome::Err { code, message } => Err(IndexerError::Remote {
                code: *code,
                message: message.clone(),
            }),
        }
    }

    async fn receipt_and_message_cid(
        &self,
        tx_hash: &str,
    ) -> Result<Option<(DecodedReceipt, String)>, IndexerError> {
        let requests = vec![
            RpcClient::tx_receipt(tx_hash),
            RpcClient::message_cid_by_tx_hash(tx_hash),
        ];
        let outcomes = call_with_retry(|| async { self.batch_call(&requests).await }).await?;

        let receipt = match &outcomes[0] {
            RpcOutcome::Ok(value) => decode_receipt(value)?,
            RpcOutcome::NullRound => return Ok(None),
            RpcOutcome::Err { code, message } => {
                return Err(IndexerError::Remote {
                    code: *code,
                    message: message.clone(),
                })
            }
        };
        let message_cid = match &outcomes[1] {
            RpcOutcome::Ok(value) => value.as_str().unwrap_or_default().to_owned(),
            RpcOutcome::NullRound => String::new(),
            RpcOutcome::Err { code, message } => {
                return Err(IndexerError::Remote {
                    code: *code,
                    message: message.clone(),
                })
            }
        };
        Ok(Some((receipt, message_cid)))
    }

    async fn eth_call(&self, to: &str, data_hex: &str) -> Result<Vec<u8>, IndexerError> {
        let outcomes = call_with_retry(|| async {
            self.batch_call(&[RpcClient::contract_view(to, data_hex)]).await
        })
        .await?;
        match &outcomes[0] {
            RpcOutcome::Ok(value) => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| IndexerError::Decode("eth_call: non-string result".into()))?;
                parse_hex_bytes(raw)
            }
            RpcOutcome::NullRound => Err(IndexerError::Decode("eth_call returned null round".into())),
            RpcOutcome::Err { code, message } => Err(IndexerError::Remote {
                code: *code,
                message: message.clone(),
            }),
        }
    }
}
