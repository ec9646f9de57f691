pub mod client;
pub mod retry;

pub use client::{RpcClient, RpcRequest};
pub use retry::{call_with_retry, RpcOutcome};

/// Result of a single request within a batch: either a decoded JSON value or
/// a structured remote error. Transport-level failure is not representable
/// here — it fails the whole batch at the `RpcClient::batch_call` level.
#[derive(Debug, Clone)]
pub enum RpcEntry {
    Ok(serde_json::Value),
    Err { code: i64, message: String },
}
