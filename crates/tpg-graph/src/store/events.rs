//! Change notifications for graph subscribers

use crate::types::{DependencyEdge, ParameterWithOptions};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A structural change to the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphChange {
    /// The whole graph was replaced
    Reloaded {
        /// Parameters in load order, with their options
        parameters: Vec<ParameterWithOptions>,
        /// Active edges after the reload
        edges: Vec<DependencyEdge>,
    },
    /// An edge was admitted
    EdgeAdded(DependencyEdge),
    /// An edge was removed
    EdgeRemoved(DependencyEdge),
}

/// Receives [`GraphChange`]s from a [`GraphStore`](crate::GraphStore)
///
/// Called after the store has released its lock, so listeners may query the
/// store.
pub trait GraphListener: Send + Sync {
    /// Handle one change
    fn on_change(&self, change: &GraphChange);
}

impl<F> GraphListener for F
where
    F: Fn(&GraphChange) + Send + Sync,
{
    fn on_change(&self, change: &GraphChange) {
        self(change);
    }
}

/// Handle returned by [`GraphStore::subscribe`](crate::GraphStore::subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, Arc<dyn GraphListener>)>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Arc<dyn GraphListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn notify(&self, change: &GraphChange) {
        // Snapshot so a listener may (un)subscribe while being notified.
        let listeners: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.on_change(change);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}
