//! User and group domain entities.

pub mod model;

pub use model::{Group, User};
