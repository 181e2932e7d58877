//! Projects and their publish history.

pub mod broker;

pub use broker::ProjectBroker;
