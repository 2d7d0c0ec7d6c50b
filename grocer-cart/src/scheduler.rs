//! Debounce timer primitive.
//!
//! [`Scheduler::arm`] runs a task after a delay and hands back a
//! [`CancelToken`]. The cart keeps one token per item and cancels it when a
//! newer edit arrives, so only the last edit of a burst is ever sent.

use std::fmt;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// A task to run when a timer fires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Arms delayed tasks.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once `delay` has elapsed, unless the returned token is
    /// cancelled first. A zero delay runs the task on a later tick, never
    /// inline.
    fn arm(&self, delay: Duration, task: TimerTask) -> CancelToken;
}

/// Handle to an armed timer.
pub struct CancelToken(Inner);

enum Inner {
    Task(AbortHandle),
    Noop,
}

impl CancelToken {
    /// Wraps a tokio task's abort handle.
    pub fn from_abort_handle(handle: AbortHandle) -> Self {
        Self(Inner::Task(handle))
    }

    /// A token with nothing behind it, for schedulers that track
    /// cancellation elsewhere.
    pub fn noop() -> Self {
        Self(Inner::Noop)
    }

    /// Cancels the timer. Has no effect once the task has run.
    pub fn cancel(&self) {
        if let Inner::Task(handle) = &self.0 {
            handle.abort();
        }
    }

    /// Returns true once the timer has fired or been cancelled.
    pub fn is_finished(&self) -> bool {
        match &self.0 {
            Inner::Task(handle) => handle.is_finished(),
            Inner::Noop => true,
        }
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Scheduler backed by `tokio::time::sleep` on a captured runtime.
///
/// Timers are spawned through the runtime handle taken at construction, so
/// `arm` works from any thread, including ones with no tokio context. Under a
/// paused tokio clock (`start_paused = true`) this is fully deterministic,
/// which is how the cart is tested.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates a scheduler for the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// The runtime timers are spawned onto.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&self, delay: Duration, task: TimerTask) -> CancelToken {
        let handle = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        CancelToken::from_abort_handle(handle.abort_handle())
    }
}
