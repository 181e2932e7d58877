//! Resource lifecycle state machine.
//!
//! ```text
//!   create ──► NEW ──modify──► NEW
//!               │
//!             delete ──► (purged)
//!
//!   UNCHANGED ──modify──► CHANGED ──modify──► CHANGED
//!       │                    │
//!     delete ──► DELETED ◄─delete
//!                   │
//!               undelete ──► CHANGED
//!
//!   publish: NEW | CHANGED ──► UNCHANGED (online), DELETED ──► (purged)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use contenthub_core::error::AppError;
use contenthub_core::result::AppResult;

/// Lifecycle state of one version of a resource.
///
/// Any state other than `Unchanged` only exists inside an offline project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    /// Identical to the published copy.
    Unchanged,
    /// Modified since the last publish.
    Changed,
    /// Created since the last publish; no online copy exists.
    New,
    /// Tombstoned; still addressable until publish or removal.
    Deleted,
}

/// Outcome of applying a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The resource stays in the store with this state.
    To(ResourceState),
    /// The resource entry must be destroyed outright.
    Purge,
}

impl ResourceState {
    /// State after the content or header was modified.
    pub fn after_modify(self) -> AppResult<ResourceState> {
        match self {
            Self::New => Ok(Self::New),
            Self::Unchanged | Self::Changed => Ok(Self::Changed),
            Self::Deleted => Err(AppError::invalid_state(
                "Deleted resources must be undeleted before they can be modified",
            )),
        }
    }

    /// Effect of a soft delete.
    ///
    /// A resource that was never published has nothing to tombstone and is
    /// purged instead.
    pub fn after_delete(self) -> AppResult<Transition> {
        match self {
            Self::New => Ok(Transition::Purge),
            Self::Unchanged | Self::Changed => Ok(Transition::To(Self::Deleted)),
            Self::Deleted => Err(AppError::invalid_state("Resource is already deleted")),
        }
    }

    /// State after a tombstone was lifted.
    pub fn after_undelete(self) -> AppResult<ResourceState> {
        match self {
            Self::Deleted => Ok(Self::Changed),
            other => Err(AppError::invalid_state(format!(
                "Only deleted resources can be undeleted (state is {other})"
            ))),
        }
    }

    /// Effect of publishing on the online copy.
    pub fn after_publish(self) -> Transition {
        match self {
            Self::Deleted => Transition::Purge,
            _ => Transition::To(Self::Unchanged),
        }
    }

    /// Whether this version still has to be published.
    pub fn is_pending(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Changed => "changed",
            Self::New => "new",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
