//! Shared helpers for unit tests.

pub(crate) mod fixtures;
pub(crate) mod socket_guard;
