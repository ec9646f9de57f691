use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IndexerError;
use crate::rpc::RpcEntry;

/// One call in a batch: JSON-RPC method name and positional params.
#[derive(Clone, Debug)]
pub struct RpcRequest {
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

#[derive(Serialize)]
struct JsonRpcCall<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// Issues batched JSON-RPC 2.0 calls against the configured Lotus-style
/// endpoint. Never retries internally — retry is the Retry Fabric's job
/// (`crate::rpc::retry`).
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Canonical request builders for the methods this indexer uses.
    pub fn block_by_number(height: u64) -> RpcRequest {
        RpcRequest::new(
            "EthGetBlockByNumber",
            serde_json::json!([format!("0x{height:x}"), true]),
        )
    }

    pub fn block_number() -> RpcRequest {
        RpcRequest::new("EthBlockNumber", serde_json::json!([]))
    }

    pub fn tx_receipt(hash: &str) -> RpcRequest {
        RpcRequest::new("EthGetTransactionReceipt", serde_json::json!([hash]))
    }

    pub fn message_cid_by_tx_hash(hash: &str) -> RpcRequest {
        RpcRequest::new(
            "EthGetMessageCidByTransactionHash",
            serde_json::json!([hash]),
        )
    }

    pub fn contract_view(to: &str, data: &str) -> RpcRequest {
        RpcRequest::new(
            "eth_call",
            serde_json::json!([{"to": to, "data": data}, "latest"]),
        )
    }

    /// Issues one HTTP round-trip carrying the whole batch. Request ordering
    /// is preserved in the returned vec. A malformed/non-2xx response
    /// surfaces as a single `IndexerError::Transport` covering the whole
    /// batch; per-request errors are carried in the individual `RpcEntry`s.
    pub async fn batch_call(&self, requests: &[RpcRequest]) -> Result<Vec<RpcEntry>, IndexerError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<JsonRpcCall> = requests
            .iter()
            .enumerate()
            .map(|(id, req)| JsonRpcCall {
                jsonrpc: "2.0",
                id: id as u64,
                method: &req.method,
                params: &req.params,
            })
            .collect();

        let mut builder = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| IndexerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexerError::Transport(format!(
                "http status {}",
                response.status()
            )));
        }

        let replies: Vec<JsonRpcReply> = response
            .json()
            .await
            .map_err(|e| IndexerError::Transport(e.to_string()))?;

        if replies.len() != requests.len() {
            return Err(IndexerError::Transport(format!(
                "batch size mismatch: sent {}, received {}",
                requests.len(),
                replies.len()
            )));
        }

        Ok(replies
            .into_iter()
            .map(|reply| match (reply.result, reply.error) {
                (_, Some(err)) => RpcEntry::Err {
                    code: err.code,
                    message: err.message,
                },
                (Some(result), None) => RpcEntry::Ok(result),
                (None, None) => RpcEntry::Ok(Value::Null),
            })
            .collect())
    }
}
