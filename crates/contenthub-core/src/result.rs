//! Convenience result type alias for ContentHub.

use crate::error::AppError;

/// A specialized `Result` type for ContentHub operations.
pub type AppResult<T> = Result<T, AppError>;
