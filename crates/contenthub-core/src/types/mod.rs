//! Core type definitions used across the ContentHub workspace.

pub mod id;

pub use id::*;
