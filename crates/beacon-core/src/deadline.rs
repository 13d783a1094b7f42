//! Deadline propagation for store-backed operations.
//!
//! Every realtime operation is an ordinary future, so dropping it cancels the
//! chain at its current `.await`. Callers that need an upstream timeout wrap
//! the call with [`with_deadline`].

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::result::AppResult;

/// Run `fut` and fail with a timeout error naming `operation` if it has not
/// completed within `deadline`.
///
/// Work already committed by the operation before the deadline is not rolled
/// back.
pub async fn with_deadline<T, F>(deadline: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(format!(
            "{operation} exceeded deadline of {}ms",
            deadline.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapsed() {
        let result: AppResult<()> = with_deadline(Duration::from_millis(10), "slow op", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(err.message.contains("slow op"));
    }

    #[tokio::test]
    async fn test_deadline_passthrough() {
        let value = with_deadline(Duration::from_secs(1), "fast op", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
