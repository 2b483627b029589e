//! Contract for the remote catalog the browser reads from.

use crate::error::Result;
use crate::types::{Episode, Show, ShowId};
use std::future::Future;

/// Read-only access to a catalog of shows and their episodes.
///
/// Both operations fail with [`AppError::Transport`](crate::error::AppError::Transport)
/// on network or HTTP failure. A show that does not exist is reported the
/// same way; there is no separate "not found" kind.
///
/// The returned futures must be `Send` because fetches are spawned onto the
/// tokio runtime.
pub trait DataSource: Send + Sync + 'static {
    /// Fetch every show in the catalog, in server order.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<Show>>> + Send;

    /// Fetch the episodes of one show, in server order.
    fn fetch_episodes(&self, show_id: ShowId) -> impl Future<Output = Result<Vec<Episode>>> + Send;
}
