//! Single-consumer execution context for queued deliveries.
//!
//! The capture thread must never block, but operations have to run on the
//! application's UI thread. An [`ExecutionContext`] is the bridge: producers
//! post boxed closures through a cloneable [`ContextHandle`] into a bounded
//! queue, and the thread that owns the context drains it in FIFO order from
//! its own loop.
//!
//! Posting never waits. If the queue is full the invocation is dropped, a
//! warning is logged and the drop counter is bumped.
//!
//! ```
//! use keyhook_core::ExecutionContext;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let (mut context, handle) = ExecutionContext::new(16);
//! let ran = Arc::new(AtomicUsize::new(0));
//!
//! let ran_clone = ran.clone();
//! std::thread::spawn(move || {
//!     handle.post(move || {
//!         ran_clone.fetch_add(1, Ordering::SeqCst);
//!     });
//! })
//! .join()
//! .unwrap();
//!
//! // On the owning thread:
//! assert_eq!(context.process_pending(), 1);
//! assert_eq!(ran.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::logging::targets;

/// Default capacity of the invocation queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// A type-erased invocation waiting to run on the context's thread.
pub struct QueuedInvocation {
    invoke: Box<dyn FnOnce() + Send>,
}

impl QueuedInvocation {
    /// Wrap a closure for deferred execution.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            invoke: Box::new(invoke),
        }
    }

    /// Run the invocation.
    pub fn execute(self) {
        (self.invoke)();
    }
}

impl fmt::Debug for QueuedInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedInvocation").finish_non_exhaustive()
    }
}

/// Counters shared by every handle of one context.
#[derive(Debug, Default)]
struct ContextStats {
    posted: AtomicU64,
    dropped: AtomicU64,
}

/// Producer side of an [`ExecutionContext`]. Cheap to clone and `Send`.
#[derive(Clone)]
pub struct ContextHandle {
    sender: Sender<QueuedInvocation>,
    stats: Arc<ContextStats>,
}

impl ContextHandle {
    /// Queue `invoke` to run on the context's thread.
    ///
    /// Returns `false` without blocking if the queue is full or the context
    /// has been dropped; the invocation is discarded in that case.
    pub fn post<F>(&self, invoke: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.sender.try_send(QueuedInvocation::new(invoke)) {
            Ok(()) => {
                self.stats.posted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    target: targets::CONTEXT,
                    capacity = ?self.sender.capacity(),
                    "execution context queue full, dropping invocation"
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(target: targets::CONTEXT, "execution context gone, dropping invocation");
                false
            }
        }
    }

    /// Number of invocations waiting in the queue.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Number of invocations discarded because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("pending", &self.pending())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// Consumer side: owned by the thread that should run queued invocations.
///
/// Not `Clone`; there is exactly one consumer.
pub struct ExecutionContext {
    receiver: Receiver<QueuedInvocation>,
    handle: ContextHandle,
}

impl ExecutionContext {
    /// Create a context whose queue holds at most `capacity` invocations.
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> (Self, ContextHandle) {
        let (sender, receiver) = bounded(capacity.max(1));
        let handle = ContextHandle {
            sender,
            stats: Arc::new(ContextStats::default()),
        };
        let context = Self {
            receiver,
            handle: handle.clone(),
        };
        (context, handle)
    }

    /// Another producer handle for this context.
    pub fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    /// Run every invocation that was queued when the call started, in FIFO
    /// order. Invocations posted while draining wait for the next call.
    ///
    /// Returns the number of invocations executed.
    pub fn process_pending(&mut self) -> usize {
        let queued = self.receiver.len();
        let mut executed = 0;
        while executed < queued {
            match self.receiver.try_recv() {
                Ok(invocation) => {
                    invocation.execute();
                    executed += 1;
                }
                Err(_) => break,
            }
        }
        executed
    }

    /// Wait up to `timeout` for the first invocation, then drain the queue.
    ///
    /// Returns the number of invocations executed; zero means the timeout
    /// elapsed with nothing queued.
    pub fn process_for(&mut self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(invocation) => {
                invocation.execute();
                1 + self.process_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Process invocations until `done` returns true or `timeout` elapses.
    /// Returns whether `done` was satisfied.
    pub fn process_until(&mut self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.process_for(remaining.min(Duration::from_millis(10)));
        }
    }

    /// Number of invocations waiting in the queue.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Total invocations accepted since creation.
    pub fn posted(&self) -> u64 {
        self.handle.stats.posted.load(Ordering::Relaxed)
    }

    /// Total invocations discarded since creation.
    pub fn dropped(&self) -> u64 {
        self.handle.dropped()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("pending", &self.pending())
            .field("posted", &self.posted())
            .field("dropped", &self.dropped())
            .finish()
    }
}
