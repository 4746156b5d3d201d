//! Cycle-safe change propagation.
//!
//! Every leaf-to-root edge (category module → industry → enterprise) owns a
//! [`CommitGuard`] holding the last value it passed upward. An edit marks the edge
//! dirty; the recomputed value is then committed, and only a value that differs from
//! the previously committed one travels further up. After every synchronous operation
//! each edge is back to [`EdgeState::Idle`].
//!
//! Notifications are plain values returned up the call stack. Nothing calls back into
//! a child, so a parent can never re-trigger the recomputation that notified it.

use crate::aggregate::{AggregateSnapshot, CategoryTotal};
use crate::ledger::EnterpriseSnapshot;
use log::trace;
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Idle,
    Dirty,
    Committed,
}

/// Value-equality guard in front of an upward notification.
#[derive(Debug, Clone)]
pub struct CommitGuard<T> {
    name: String,
    state: EdgeState,
    committed: T,
}

impl<T: Clone + PartialEq + Debug> CommitGuard<T> {
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            name: name.into(),
            state: EdgeState::Idle,
            committed: initial,
        }
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    /// The last value passed upward.
    pub fn committed(&self) -> &T {
        &self.committed
    }

    fn transition(&mut self, to: EdgeState) {
        trace!("{}: {:?} -> {:?}", self.name, self.state, to);
        self.state = to;
    }

    pub fn mark_dirty(&mut self) {
        if self.state != EdgeState::Dirty {
            self.transition(EdgeState::Dirty);
        }
    }

    /// Offer a recomputed value.
    ///
    /// Returns the value exactly when it differs from the committed one. Either way the
    /// edge ends idle.
    pub fn commit(&mut self, candidate: T) -> Option<T> {
        self.mark_dirty();
        if candidate == self.committed {
            self.transition(EdgeState::Idle);
            return None;
        }
        self.committed = candidate.clone();
        self.transition(EdgeState::Committed);
        self.transition(EdgeState::Idle);
        Some(candidate)
    }
}

/// A value-level change leaving one edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    CategoryTotal {
        industry: String,
        total: CategoryTotal,
    },
    Aggregate(Arc<AggregateSnapshot>),
    Enterprise(Arc<EnterpriseSnapshot>),
}

/// Receiver of change notifications.
///
/// Implement the per-level callbacks, or pass any `FnMut(&Notification)` closure.
pub trait ChangeObserver {
    fn on_category_total_change(&mut self, _industry: &str, _total: &CategoryTotal) {}

    fn on_aggregate_change(&mut self, _snapshot: &AggregateSnapshot) {}

    fn on_enterprise_change(&mut self, _snapshot: &EnterpriseSnapshot) {}

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::CategoryTotal { industry, total } => {
                self.on_category_total_change(industry, total)
            }
            Notification::Aggregate(snapshot) => self.on_aggregate_change(snapshot),
            Notification::Enterprise(snapshot) => self.on_enterprise_change(snapshot),
        }
    }
}

impl<F> ChangeObserver for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_value_does_not_propagate() {
        let mut guard = CommitGuard::new("edge", 1.0);
        guard.mark_dirty();
        assert_eq!(guard.state(), EdgeState::Dirty);
        assert_eq!(guard.commit(1.0), None);
        assert_eq!(guard.state(), EdgeState::Idle);
    }

    #[test]
    fn changed_value_propagates_once() {
        let mut guard = CommitGuard::new("edge", 1.0);
        assert_eq!(guard.commit(2.0), Some(2.0));
        assert_eq!(guard.state(), EdgeState::Idle);
        assert_eq!(*guard.committed(), 2.0);
        // Offering the same value again is silent
        assert_eq!(guard.commit(2.0), None);
    }

    #[test]
    fn shared_values_compare_by_value() {
        let mut guard = CommitGuard::new("edge", Arc::new(vec![1, 2]));
        assert!(guard.commit(Arc::new(vec![1, 2])).is_none());
        assert!(guard.commit(Arc::new(vec![1, 3])).is_some());
    }

    #[test]
    fn closures_observe_notifications() {
        let mut seen = Vec::new();
        {
            let mut observer = |n: &Notification| seen.push(n.clone());
            observer.notify(&Notification::CategoryTotal {
                industry: "steel".to_string(),
                total: CategoryTotal::zero("combustion"),
            });
        }
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn structs_observe_by_level() {
        #[derive(Default)]
        struct Counter {
            categories: usize,
            aggregates: usize,
        }

        impl ChangeObserver for Counter {
            fn on_category_total_change(&mut self, _industry: &str, _total: &CategoryTotal) {
                self.categories += 1;
            }

            fn on_aggregate_change(&mut self, _snapshot: &AggregateSnapshot) {
                self.aggregates += 1;
            }
        }

        let mut counter = Counter::default();
        counter.notify(&Notification::Aggregate(Arc::new(AggregateSnapshot::empty("x"))));
        assert_eq!(counter.aggregates, 1);
        assert_eq!(counter.categories, 0);
    }
}
