//! Shared helpers for applications embedding the snapshot store.

pub mod bootstrap;

pub use bootstrap::init_tracing;
