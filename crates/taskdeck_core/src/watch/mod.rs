//! Explicit change subscriptions over task queries.
//!
//! # Responsibility
//! - Let hosts register a task query plus callback and be re-invoked with
//!   the fresh snapshot after every write.
//!
//! # Invariants
//! - `subscribe` delivers the current snapshot before returning.
//! - `publish` reloads every live subscription exactly once, in
//!   subscription order.
//! - An unsubscribed callback is never invoked again.
//! - Clones of a feed share one subscriber table.

use crate::model::task::Task;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoResult;
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

/// Handle returned by [`ChangeFeed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Read side used by the feed to refresh snapshots.
pub trait TaskSource {
    fn load_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
}

impl<R: TaskRepository> TaskSource for R {
    fn load_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.list_tasks(query)
    }
}

type SnapshotCallback = Box<dyn FnMut(&[Task])>;

struct Subscription {
    id: SubscriptionId,
    query: TaskListQuery,
    callback: SnapshotCallback,
}

#[derive(Default)]
struct FeedTable {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Subscriber table owned by the host.
///
/// Clones share one table, so every service holding a clone refreshes the
/// same subscribers. Callbacks must not subscribe or unsubscribe from inside
/// a delivery.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    table: Rc<RefCell<FeedTable>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `query` and delivers the current snapshot.
    pub fn subscribe<S, F>(
        &self,
        source: &S,
        query: TaskListQuery,
        callback: F,
    ) -> RepoResult<SubscriptionId>
    where
        S: TaskSource + ?Sized,
        F: FnMut(&[Task]) + 'static,
    {
        let mut callback: SnapshotCallback = Box::new(callback);
        let snapshot = source.load_tasks(&query)?;
        callback(&snapshot);

        let mut table = self.table.borrow_mut();
        let id = SubscriptionId(table.next_id);
        table.next_id += 1;
        table.subscriptions.push(Subscription {
            id,
            query,
            callback,
        });
        Ok(id)
    }

    /// Removes a subscription. Returns `false` when the ID is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut table = self.table.borrow_mut();
        let before = table.subscriptions.len();
        table.subscriptions.retain(|subscription| subscription.id != id);
        table.subscriptions.len() != before
    }

    /// Re-runs every subscribed query and hands each callback its snapshot.
    ///
    /// A failed reload is logged and skipped; the remaining subscribers are
    /// still refreshed. A publish triggered from inside a callback is
    /// dropped. Returns the number of callbacks invoked.
    pub fn publish<S>(&self, source: &S) -> usize
    where
        S: TaskSource + ?Sized,
    {
        let Ok(mut table) = self.table.try_borrow_mut() else {
            warn!("event=feed_publish module=watch status=skipped reason=reentrant");
            return 0;
        };

        let mut delivered = 0;
        for subscription in &mut table.subscriptions {
            match source.load_tasks(&subscription.query) {
                Ok(snapshot) => {
                    (subscription.callback)(&snapshot);
                    delivered += 1;
                }
                Err(err) => warn!(
                    "event=feed_publish module=watch status=error subscription={} error={}",
                    subscription.id.0, err
                ),
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.table.borrow().subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().subscriptions.is_empty()
    }
}
