//! Jobscope Client - HTTP access to the published snapshot
//!
//! - [`snapshot`] downloads the SQLite snapshot and refreshes the local copy
//!   only when its content changed.

pub mod snapshot;

pub use snapshot::SnapshotClient;
