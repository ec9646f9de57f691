use thiserror::Error;

/// Errors callers are expected to match on. Everything else (handler-level
/// failures, decode failures that are local to one log/transaction) is
/// carried as `anyhow::Error` and logged at the call site instead.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rpc error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Store(#[from] sea_orm::DbErr),

    #[error("reorg depth {depth} exceeds cap")]
    ReorgDepth { depth: u64 },

    #[error("reorg reconciliation deadline exceeded")]
    ReorgDeadlineExceeded,
}

/// The sentinel RPC error code meaning "no tipset at this height".
pub const NULL_ROUND_CODE: i64 = 12;
