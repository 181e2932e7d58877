//! Deadline applied to every access-module call.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;

/// Upper bound on the duration of one access-module call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeout {
    limit: Option<Duration>,
}

impl CallTimeout {
    /// `0` means no limit.
    pub fn from_millis(millis: u64) -> Self {
        Self {
            limit: (millis > 0).then(|| Duration::from_millis(millis)),
        }
    }

    /// No limit at all.
    pub fn unbounded() -> Self {
        Self { limit: None }
    }

    /// Await `call`, failing with [`ErrorKind::Timeout`] once the limit
    /// passes. The call is dropped on expiry.
    ///
    /// [`ErrorKind::Timeout`]: contenthub_core::error::ErrorKind::Timeout
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let Some(limit) = self.limit else {
            return call.await;
        };
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                let millis = limit.as_millis() as u64;
                warn!(operation, timeout_ms = millis, "Access module call timed out");
                Err(AppError::timeout(format!(
                    "{operation} did not complete within {millis} ms"
                )))
            }
        }
    }
}
