use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{IndexerError, NULL_ROUND_CODE};
use crate::rpc::RpcEntry;

const MAX_ATTEMPTS: u32 = 3;

/// Per-entry outcome after retry classification: a decoded value, the benign
/// null-round sentinel, or (only after exhausting retries) a surfaced error.
#[derive(Debug, Clone)]
pub enum RpcOutcome {
    Ok(serde_json::Value),
    NullRound,
    Err { code: i64, message: String },
}

fn classify(entries: Vec<RpcEntry>) -> (Vec<RpcOutcome>, Option<(i64, String)>) {
    let mut first_error = None;
    let outcomes = entries
        .into_iter()
        .map(|entry| match entry {
            RpcEntry::Ok(value) => RpcOutcome::Ok(value),
            RpcEntry::Err { code, .. } if code == NULL_ROUND_CODE => RpcOutcome::NullRound,
            RpcEntry::Err { code, message } => {
                if first_error.is_none() {
                    first_error = Some((code, message.clone()));
                }
                RpcOutcome::Err { code, message }
            }
        })
        .collect();
    (outcomes, first_error)
}

/// Wraps a batched call with bounded exponential backoff: delay before
/// retry `k` (0-indexed) is `1s * 2^k`, up to `MAX_ATTEMPTS` total attempts.
/// A transport failure retries the whole batch; a per-request error other
/// than `NULL_ROUND` also retries the whole batch (the batch is idempotent
/// to re-issue). On exhaustion, the last recorded failure is surfaced.
pub async fn call_with_retry<F, Fut>(mut call: F) -> Result<Vec<RpcOutcome>, IndexerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<RpcEntry>, IndexerError>>,
{
    let mut last_err: Option<IndexerError> = None;

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << (attempt - 1));
            tokio::time::sleep(delay).await;
        }

        match call().await {
            Ok(entries) => {
                let (outcomes, first_error) = classify(entries);
                match first_error {
                    None => return Ok(outcomes),
                    Some((code, message)) => {
                        warn!(code, message = %message, attempt, "rpc batch contained a non-null-round error, retrying");
                        last_err = Some(IndexerError::Remote { code, message });
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, attempt, "rpc transport error, retrying");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| IndexerError::Transport("retry loop exhausted with no recorded error".into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_on_first_try_without_sleeping() {
        let calls = AtomicU32::new(0);
        let result = call_with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(vec![RpcEntry::Ok(serde_json::json!(1))]) }
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.as_slice(), [RpcOutcome::Ok(v)] if *v == serde_json::json!(1)));
    }

    #[tokio::test]
    async fn null_round_is_not_an_error() {
        let result = call_with_retry(|| async {
            Ok(vec![RpcEntry::Err {
                code: NULL_ROUND_CODE,
                message: "null round".into(),
            }])
        })
        .await
        .unwrap();

        assert!(matches!(result.as_slice(), [RpcOutcome::NullRound]));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let err = call_with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(vec![RpcEntry::Err {
                    code: 1,
                    message: "boom".into(),
                }])
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
        assert!(matches!(err, IndexerError::Remote { code: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_retries() {
        let calls = AtomicU32::new(0);
        let err = call_with_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 1 {
                    Err(IndexerError::Transport("reset".into()))
                } else {
                    Ok(vec![RpcEntry::Ok(serde_json::json!(true))])
                }
            }
        })
        .await;

        assert!(err.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
