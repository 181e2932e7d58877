//! # contenthub-access
//!
//! The [`AccessModule`] trait is the narrow interface the brokers consume
//! from the persistent backing store. [`memory::MemoryAccessModule`]
//! implements it in-process for tests and for the bootstrap binary.

pub mod memory;
pub mod module;

pub use memory::{Fault, MemoryAccessModule};
pub use module::AccessModule;
