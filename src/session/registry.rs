//! Observer registry for state-change notifications.
//!
//! Observers are keyed by an opaque [`SubscriptionId`]. Transitions are queued
//! together with a snapshot of the observer set and delivered in order by a
//! single draining caller, outside the controller's state lock. Callbacks may
//! subscribe, unsubscribe or trigger further transitions from inside their own
//! invocation; nested transitions are queued behind the current one.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::warn;
use uuid::Uuid;

use crate::types::SessionState;

/// Callback invoked with the new state on every transition.
pub type StateCallback = dyn Fn(SessionState) + Send + Sync + 'static;

thread_local! {
    /// Observer whose callback is running on this thread, if any.
    static DELIVERING: Cell<Option<SubscriptionId>> = const { Cell::new(None) };
}

// ============================================================================
// SubscriptionId
// ============================================================================

/// Opaque handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Observer
// ============================================================================

pub(crate) struct Observer {
    id: SubscriptionId,
    callback: Box<StateCallback>,
    /// Cleared on unsubscribe so snapshots taken earlier skip this observer.
    active: AtomicBool,
    /// Held across the `active` check and the callback invocation.
    gate: Mutex<()>,
}

impl Observer {
    /// Invokes the callback, isolating a panic to this observer.
    fn deliver(&self, state: SessionState) {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        let outer = DELIVERING.with(|current| current.replace(Some(self.id)));
        let result = panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(state)));
        DELIVERING.with(|current| current.set(outer));
        if result.is_err() {
            warn!(subscription = %self.id, %state, "state observer panicked");
        }
    }

    /// Stops future deliveries and waits out an in-flight one.
    ///
    /// An observer retiring itself from inside its own callback does not wait.
    fn retire(&self) {
        self.active.store(false, Ordering::Release);
        let own_callback = DELIVERING.with(|current| current.get()) == Some(self.id);
        if !own_callback {
            drop(self.gate.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }
}

// ============================================================================
// ObserverRegistry
// ============================================================================

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: Mutex<HashMap<SubscriptionId, Arc<Observer>>>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriptionId, Arc<Observer>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a callback and returns its handle.
    pub(crate) fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(SessionState) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let observer = Arc::new(Observer {
            id,
            callback: Box::new(callback),
            active: AtomicBool::new(true),
            gate: Mutex::new(()),
        });
        self.lock().insert(id, observer);

        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    /// Removes a registration. Returns false if it was already gone.
    ///
    /// Blocks until an in-flight callback of this observer on another thread
    /// has returned.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().remove(&id);
        match removed {
            Some(observer) => {
                observer.retire();
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Copies the current observer set for delivery outside any lock.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Observer>> {
        self.lock().values().cloned().collect()
    }
}

/// Delivers `state` to every observer in `observers`.
fn notify_all(observers: &[Arc<Observer>], state: SessionState) {
    for observer in observers {
        observer.deliver(state);
    }
}

// ============================================================================
// DeliveryQueue
// ============================================================================

#[derive(Default)]
struct PendingDeliveries {
    queue: VecDeque<(SessionState, Vec<Arc<Observer>>)>,
    draining: bool,
}

/// Transitions waiting to be delivered, in the order they were accepted.
#[derive(Default)]
pub(crate) struct DeliveryQueue {
    pending: Mutex<PendingDeliveries>,
}

impl DeliveryQueue {
    fn lock(&self) -> MutexGuard<'_, PendingDeliveries> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a transition. Must be called while the transition is still
    /// protected by the caller's state lock so queue order matches it.
    pub(crate) fn push(&self, state: SessionState, observers: Vec<Arc<Observer>>) {
        self.lock().queue.push_back((state, observers));
    }

    /// Delivers queued transitions unless another caller is already doing so.
    ///
    /// Transitions triggered from inside a callback are queued and picked up
    /// by the same loop once the current one has been delivered.
    pub(crate) fn drain(&self) {
        {
            let mut pending = self.lock();
            if pending.draining {
                return;
            }
            pending.draining = true;
        }
        loop {
            let next = {
                let mut pending = self.lock();
                match pending.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        pending.draining = false;
                        return;
                    }
                }
            };
            let (state, observers) = next;
            notify_all(&observers, state);
        }
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle returned by `subscribe_state_change`.
///
/// Dropping the handle keeps the observer registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<ObserverRegistry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the registration. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
