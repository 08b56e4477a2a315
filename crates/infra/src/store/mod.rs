//! Network persistence boundary.
//!
//! The whole network is small enough to load at once: writers read a
//! snapshot, decide a change set against it, and commit that change set with
//! the snapshot's revision as the expected version.

use thiserror::Error;

use tradenet_core::ExpectedVersion;
use tradenet_network::{ChangeSet, NetworkSnapshot};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryNetworkStore;
pub use postgres::PostgresNetworkStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency failure (stale revision, concurrent write).
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// The backend refused the write (foreign key, check constraint).
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// Connection, IO or decoding failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait NetworkStore: Send + Sync {
    /// The full network at the latest committed revision.
    async fn snapshot(&self) -> Result<NetworkSnapshot, StoreError>;

    /// Atomically apply `changes`; returns the new revision.
    ///
    /// Fails with [`StoreError::Conflict`] when `expected` does not match the
    /// current revision.
    async fn commit(&self, expected: ExpectedVersion, changes: ChangeSet) -> Result<u64, StoreError>;

    /// Remove every node, contact and product; returns the new revision.
    async fn clear(&self) -> Result<u64, StoreError>;
}
