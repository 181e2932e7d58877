//! # contenthub-core
//!
//! Core crate for ContentHub. Contains configuration schemas, typed
//! numeric identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ContentHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
