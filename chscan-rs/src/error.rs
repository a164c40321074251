//! Error types for the scan core.

use thiserror::Error;

/// Errors returned by a [`PersistenceGateway`](crate::gateway::PersistenceGateway).
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The channel to update does not exist in the store.
    #[error("Channel not found: {0}")]
    NotFound(String),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] crate::database::DatabaseError),

    /// Any other storage failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors returned while committing a batch.
#[derive(Error, Debug)]
pub enum CommitError {
    /// Persisted channels could not be read to plan the commit.
    /// Nothing was written and the batch is still pending.
    #[error("Failed to read persisted channels: {0}")]
    Snapshot(#[source] GatewayError),

    /// A write failed; the remaining operations are kept for a retry.
    #[error("Commit aborted after {completed} of {total} operations: {source}")]
    Aborted {
        completed: usize,
        total: usize,
        #[source]
        source: GatewayError,
    },
}

impl CommitError {
    /// Number of operations that did reach the store.
    pub fn completed(&self) -> usize {
        match self {
            CommitError::Snapshot(_) => 0,
            CommitError::Aborted { completed, .. } => *completed,
        }
    }
}

/// Errors returned by [`ScanSession::handle`](crate::session::ScanSession::handle).
#[derive(Error, Debug)]
pub enum SessionError {
    /// The old-channel snapshot could not be read; it will be retried on the
    /// next program event.
    #[error("Failed to snapshot persisted channels: {0}")]
    Snapshot(#[source] GatewayError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
