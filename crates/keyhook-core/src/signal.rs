//! Observer lists with explicit connection ids.
//!
//! A [`Signal<Args>`] holds connected slots. Each [`connect`](Signal::connect)
//! returns a [`ConnectionId`] that can later be passed to
//! [`disconnect`](Signal::disconnect); disconnecting twice is harmless.
//!
//! # Connection Types
//!
//! - **Direct**: the slot runs immediately on the emitting thread. For
//!   shortcut signals that is the capture thread, so direct slots must be
//!   quick and must not block.
//! - **Queued**: the slot is posted to an [`ExecutionContext`] and runs when
//!   that context drains its queue, on the context's thread.
//!
//! # Example
//!
//! ```
//! use keyhook_core::{ExecutionContext, Signal};
//!
//! let (mut context, handle) = ExecutionContext::new(16);
//! let signal = Signal::<String>::new();
//!
//! let id = signal.connect_queued(&handle, |text| println!("got {text}"));
//! signal.emit("hello".to_string());
//! assert_eq!(context.process_pending(), 1);
//!
//! assert!(signal.disconnect(id));
//! assert!(!signal.disconnect(id));
//! ```
//!
//! [`ExecutionContext`]: crate::ExecutionContext

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::context::ContextHandle;
use crate::logging::targets;

new_key_type! {
    /// Identifies one signal-slot connection.
    ///
    /// Returned by [`Signal::connect`] and [`Signal::connect_queued`]; pass it
    /// to [`Signal::disconnect`] to remove the slot.
    pub struct ConnectionId;
}

/// How a connected slot is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    /// Invoke the slot immediately on the emitting thread.
    Direct,
    /// Post the slot to an execution context.
    Queued,
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

enum Delivery {
    Direct,
    Queued(ContextHandle),
}

struct Connection<Args> {
    slot: Slot<Args>,
    delivery: Delivery,
}

/// A signal that can have any number of connected slots.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot that runs on the emitting thread.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Arc::new(slot), Delivery::Direct)
    }

    /// Connect a slot that runs on the execution context behind `context`.
    pub fn connect_queued<F>(&self, context: &ContextHandle, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Arc::new(slot), Delivery::Queued(context.clone()))
    }

    /// Disconnect a slot. Returns `true` if it was connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// The connection type of `id`, if it is still connected.
    pub fn connection_type(&self, id: ConnectionId) -> Option<ConnectionType> {
        self.connections.lock().get(id).map(|conn| match conn.delivery {
            Delivery::Direct => ConnectionType::Direct,
            Delivery::Queued(_) => ConnectionType::Queued,
        })
    }

    /// Block emission temporarily. While blocked, `emit()` does nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if emission is blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal.
    ///
    /// The connection list is released before any slot runs, so a slot may
    /// connect or disconnect on this same signal.
    #[tracing::instrument(skip_all, target = "keyhook_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let receivers: Vec<(Slot<Args>, Option<ContextHandle>)> = {
            let connections = self.connections.lock();
            connections
                .values()
                .map(|conn| {
                    let context = match &conn.delivery {
                        Delivery::Direct => None,
                        Delivery::Queued(handle) => Some(handle.clone()),
                    };
                    (Arc::clone(&conn.slot), context)
                })
                .collect()
        };
        tracing::trace!(target: targets::SIGNAL, connection_count = receivers.len(), "emitting signal");

        for (slot, context) in receivers {
            match context {
                None => slot(&args),
                Some(context) => {
                    let args = args.clone();
                    if !context.post(move || slot(&args)) {
                        tracing::warn!(target: targets::SIGNAL, "queued slot dropped");
                    }
                }
            }
        }
    }

    fn insert(&self, slot: Slot<Args>, delivery: Delivery) -> ConnectionId {
        self.connections.lock().insert(Connection { slot, delivery })
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect_is_idempotent() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2);
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_queued_runs_on_context() {
        let (mut context, handle) = ExecutionContext::new(8);
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let id = signal.connect_queued(&handle, move |&value| {
            received_clone.lock().push(value);
        });
        assert_eq!(signal.connection_type(id), Some(ConnectionType::Queued));

        signal.emit(7);
        signal.emit(8);
        assert!(received.lock().is_empty());

        assert_eq!(context.process_pending(), 2);
        assert_eq!(*received.lock(), vec![7, 8]);
    }

    #[test]
    fn test_queued_from_other_thread() {
        let (mut context, handle) = ExecutionContext::new(8);
        let signal = Arc::new(Signal::<i32>::new());
        let seen_on = Arc::new(Mutex::new(None));

        let seen_clone = seen_on.clone();
        signal.connect_queued(&handle, move |_| {
            *seen_clone.lock() = Some(std::thread::current().id());
        });

        let emitter = signal.clone();
        std::thread::spawn(move || emitter.emit(1)).join().unwrap();

        context.process_pending();
        assert_eq!(*seen_on.lock(), Some(std::thread::current().id()));
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let id_cell = Arc::new(Mutex::new(None));

        let signal_clone = signal.clone();
        let id_clone = id_cell.clone();
        let id = signal.connect(move |_| {
            if let Some(id) = *id_clone.lock() {
                signal_clone.disconnect(id);
            }
        });
        *id_cell.lock() = Some(id);

        signal.emit(());
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();
        for _ in 0..5 {
            signal.connect(|_| {});
        }

        assert_eq!(signal.connection_count(), 5);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }
}
