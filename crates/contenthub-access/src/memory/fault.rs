//! Fault injection and call accounting for the in-memory access module.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;

/// A fault to raise on every call of one operation until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail with a repository error.
    Fail,
    /// Sleep before answering.
    Delay(Duration),
}

#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    faults: Mutex<HashMap<&'static str, Fault>>,
    calls: Mutex<HashMap<&'static str, u64>>,
}

impl FaultPlan {
    pub(crate) fn set(&self, operation: &'static str, fault: Fault) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(operation, fault);
    }

    pub(crate) fn clear(&self) {
        self.faults.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub(crate) fn calls(&self, operation: &str) -> u64 {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Count one call of `operation` and raise its fault, if any.
    pub(crate) async fn enter(&self, operation: &'static str) -> AppResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(operation)
            .or_default() += 1;

        let fault = self
            .faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(operation)
            .copied();
        match fault {
            None => Ok(()),
            Some(Fault::Fail) => Err(AppError::repository(format!(
                "Injected failure in {operation}"
            ))),
            Some(Fault::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
