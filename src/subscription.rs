//! Live query subscriptions with whole-snapshot delivery.
//!
//! A subscription forwards every snapshot of a live query to a callback until
//! it is cancelled. Snapshots always carry the full current result set, so a
//! consumer replaces its state with the latest one and never diffs.

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::Document;
use crate::store::{DocumentStore, Query};

/// Cancellation handle for a live query. Dropping it also cancels.
pub struct Subscription {
    scope: String,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stops delivery and releases the live connection.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("Unsubscribing from '{}'", self.scope);
        self.task.abort();
    }
}

/// Opens `query` on `store` and calls `on_data` with each full result set.
///
/// A backend error is logged and ends delivery; there is no reconnect.
pub fn subscribe<F>(store: &dyn DocumentStore, query: Query, mut on_data: F) -> Subscription
where
    F: FnMut(Vec<Document>) + Send + 'static,
{
    let scope = query.scope.name().to_string();
    let mut snapshots = store.watch(query);
    let task_scope = scope.clone();

    let task = tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            match snapshot {
                Ok(documents) => {
                    debug!(
                        "Snapshot of '{}' with {} documents",
                        task_scope,
                        documents.len()
                    );
                    on_data(documents);
                }
                Err(e) => {
                    warn!("Subscription to '{}' stopped: {}", task_scope, e);
                    break;
                }
            }
        }
    });

    debug!("Subscribed to '{}' on {}", scope, store.get_name());
    Subscription { scope, task }
}
