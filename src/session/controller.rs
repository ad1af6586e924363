//! Session controller for the pomodoro timer.
//!
//! This module provides the core session lifecycle:
//! - State transitions (Idle → PomodoroRunning / BreakRunning → Idle)
//! - One-shot countdowns armed with `tokio::time::sleep_until`
//! - Stale-expiry suppression through per-countdown generations
//! - Ordered observer notification outside the state lock
//! - Shutdown bounded by a deadline or a cancellation signal

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, trace, warn};

use super::error::SessionError;
use super::registry::{DeliveryQueue, ObserverRegistry, Subscription};
use crate::types::{SessionConfig, SessionKind, SessionState, StatusSnapshot};

// ============================================================================
// Internal state
// ============================================================================

/// An armed countdown backing a running session.
struct Countdown {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Everything mutated by start, expiry and shutdown.
struct Core {
    state: SessionState,
    countdown: Option<Countdown>,
    /// Last generation handed out; every armed countdown gets a fresh one.
    generation: u64,
    shut_down: bool,
}

struct Inner {
    config: SessionConfig,
    runtime: Handle,
    core: Mutex<Core>,
    observers: Arc<ObserverRegistry>,
    /// Filled under the core lock, drained after it is released.
    deliveries: DeliveryQueue,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handles a countdown reaching its deadline.
    fn expire(&self, generation: u64) {
        {
            let mut core = self.lock();
            let current = core.countdown.as_ref().map(|c| c.generation);
            if current != Some(generation) {
                trace!(generation, "discarding stale countdown expiry");
                return;
            }
            core.countdown = None;
            let previous = std::mem::replace(&mut core.state, SessionState::Idle);
            debug!(from = %previous, "session expired");
            self.deliveries.push(SessionState::Idle, self.observers.snapshot());
        }
        self.deliveries.drain();
    }

    /// Cancels the countdown, forces `Idle` and marks the controller closed.
    ///
    /// Returns the cancelled countdown's task so the caller can wait for it.
    fn close(&self) -> Option<JoinHandle<()>> {
        let pending = {
            let mut core = self.lock();
            core.shut_down = true;
            let pending = core.countdown.take().map(|countdown| {
                countdown.handle.abort();
                countdown.handle
            });
            if core.state.is_running() {
                let previous = std::mem::replace(&mut core.state, SessionState::Idle);
                debug!(from = %previous, "session cancelled by shutdown");
                self.deliveries.push(SessionState::Idle, self.observers.snapshot());
            }
            pending
        };
        self.deliveries.drain();
        pending
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(countdown) = core.countdown.take() {
            countdown.handle.abort();
        }
    }
}

// ============================================================================
// SessionController
// ============================================================================

/// Tracks the current pomodoro/break session and notifies observers.
///
/// Cloning yields another handle to the same controller. Dropping the last
/// handle aborts any running countdown.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Creates a controller whose countdowns run on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidDuration`] if a duration is zero and
    /// [`SessionError::RuntimeUnavailable`] when called outside a runtime.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let runtime = Handle::try_current().map_err(|_| SessionError::RuntimeUnavailable)?;
        Self::with_runtime(config, runtime)
    }

    /// Creates a controller whose countdowns run on `runtime`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidDuration`] if a duration is zero.
    pub fn with_runtime(config: SessionConfig, runtime: Handle) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                runtime,
                core: Mutex::new(Core {
                    state: SessionState::Idle,
                    countdown: None,
                    generation: 0,
                    shut_down: false,
                }),
                observers: ObserverRegistry::new(),
                deliveries: DeliveryQueue::default(),
            }),
        })
    }

    /// Starts a pomodoro session unless one is already running.
    pub fn start_pomodoro(&self) {
        self.start(SessionKind::Pomodoro);
    }

    /// Starts a break session unless one is already running.
    pub fn start_break(&self) {
        self.start(SessionKind::Break);
    }

    /// Starts a session of the given kind.
    ///
    /// Re-starting the kind that is already running is a no-op: the countdown
    /// keeps its deadline and observers are not notified again. Any other
    /// running session is superseded. After shutdown this does nothing.
    pub fn start(&self, kind: SessionKind) {
        let target = kind.running_state();
        {
            let mut core = self.inner.lock();
            if core.shut_down {
                warn!(%kind, "ignoring start after shutdown");
                return;
            }
            if core.state == target {
                debug!(%kind, "session already running");
                return;
            }
            if let Some(previous) = core.countdown.take() {
                previous.handle.abort();
            }

            core.generation += 1;
            let generation = core.generation;
            let duration = self.inner.config.duration_for(kind);
            let deadline = Instant::now() + duration;
            let handle = self.arm(generation, deadline);
            core.countdown = Some(Countdown {
                generation,
                deadline,
                handle,
            });
            let previous = std::mem::replace(&mut core.state, target);
            debug!(from = %previous, to = %target, ?duration, "session started");
            self.inner.deliveries.push(target, self.inner.observers.snapshot());
        }
        self.inner.deliveries.drain();
    }

    /// Spawns the one-shot countdown task.
    fn arm(&self, generation: u64, deadline: Instant) -> JoinHandle<()> {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.runtime.spawn(async move {
            sleep_until(deadline).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire(generation);
            }
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Returns the time left in the active session, or zero when idle.
    pub fn remaining(&self) -> Duration {
        Self::remaining_in(&self.inner.lock())
    }

    /// Returns the state and remaining time read under a single lock.
    pub fn status(&self) -> StatusSnapshot {
        let core = self.inner.lock();
        StatusSnapshot::new(core.state, Self::remaining_in(&core))
    }

    fn remaining_in(core: &Core) -> Duration {
        core.countdown
            .as_ref()
            .map(|c| c.deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Returns true once shutdown has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }

    /// Registers `callback` for every future transition.
    ///
    /// Callbacks run outside the controller's lock and receive transitions in
    /// the order they happened. A callback may call back into the controller;
    /// a transition it triggers is delivered after the current one finishes.
    pub fn subscribe_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(SessionState) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(callback)
    }

    /// Registers a permanent observer.
    pub fn on_state_change<F>(&self, callback: F)
    where
        F: Fn(SessionState) + Send + Sync + 'static,
    {
        let _ = self.subscribe_state_change(callback);
    }

    /// Returns the number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Stops the controller, waiting for cleanup until `deadline`.
    ///
    /// Cleanup always runs. If `deadline` had already passed on entry, or
    /// elapses while the cancelled countdown is being reaped, the state is
    /// still forced to `Idle` but [`SessionError::ShutdownTimedOut`] is returned.
    pub async fn shutdown(&self, deadline: Instant) -> Result<(), SessionError> {
        let expired = Instant::now() >= deadline;
        let pending = self.inner.close();
        if expired {
            warn!("shutdown deadline already elapsed");
            return Err(SessionError::ShutdownTimedOut);
        }
        if let Some(handle) = pending {
            if timeout_at(deadline, handle).await.is_err() {
                warn!("shutdown deadline elapsed while reaping countdown");
                return Err(SessionError::ShutdownTimedOut);
            }
        }
        info!("session controller shut down");
        Ok(())
    }

    /// Stops the controller, waiting for cleanup until `signal` resolves.
    ///
    /// A signal that has already resolved on entry still lets cleanup run but
    /// yields [`SessionError::ShutdownCancelled`].
    pub async fn shutdown_with<F>(&self, signal: F) -> Result<(), SessionError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);
        let cancelled = tokio::select! {
            biased;
            _ = &mut signal => true,
            _ = std::future::ready(()) => false,
        };

        let pending = self.inner.close();
        if cancelled {
            warn!("shutdown cancelled before cleanup");
            return Err(SessionError::ShutdownCancelled);
        }
        if let Some(handle) = pending {
            tokio::select! {
                biased;
                _ = handle => {}
                _ = &mut signal => {
                    warn!("shutdown cancelled while reaping countdown");
                    return Err(SessionError::ShutdownCancelled);
                }
            }
        }
        info!("session controller shut down");
        Ok(())
    }

    #[cfg(test)]
    fn current_generation(&self) -> Option<u64> {
        self.inner.lock().countdown.as_ref().map(|c| c.generation)
    }

    #[cfg(test)]
    fn expire_generation(&self, generation: u64) {
        self.inner.expire(generation);
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("SessionController")
            .field("state", &core.state)
            .field("shut_down", &core.shut_down)
            .field("config", &self.inner.config)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
