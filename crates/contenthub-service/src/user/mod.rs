//! Users, groups, and group membership.

pub mod broker;

pub use broker::UserGroupBroker;
