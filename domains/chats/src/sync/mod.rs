//! Dual-store synchronization

pub mod coordinator;

pub use coordinator::SyncCoordinator;
