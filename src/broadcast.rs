//! Single-value broadcast stores with replay-on-subscribe.
//!
//! A [`BroadcastStore`] holds one current value and a set of subscribers.
//! `set` replaces the value and fans it out synchronously, in subscription
//! order; `subscribe` delivers the current value immediately, so a late
//! subscriber never misses the latest state. Pure in-memory primitive, no
//! I/O and no error conditions.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a store subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

struct Subscriber<T> {
    id: SubscriberId,
    sender: Sender<T>,
}

struct Shared<T> {
    current: T,
    /// Subscription order is part of the contract, hence a Vec.
    subscribers: Vec<Subscriber<T>>,
}

/// A single current value plus an ordered set of subscribers.
pub struct BroadcastStore<T: Clone> {
    shared: RwLock<Shared<T>>,
    next_id: AtomicU64,
}

impl<T: Clone> BroadcastStore<T> {
    /// Create a store holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            shared: RwLock::new(Shared {
                current: initial,
                subscribers: Vec::new(),
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current value, synchronously.
    pub fn get(&self) -> T {
        self.shared.read().current.clone()
    }

    /// Replace the current value and deliver it to every subscriber in
    /// subscription order. Subscribers whose receiving half is gone are
    /// pruned during delivery.
    pub fn set(&self, value: T) {
        let mut shared = self.shared.write();
        shared.current = value.clone();
        shared
            .subscribers
            .retain(|sub| sub.sender.send(value.clone()).is_ok());
    }

    /// Register a subscriber. The value current at subscribe time is
    /// delivered immediately, followed by every later `set` in order.
    pub fn subscribe(&self) -> ValueSubscription<T> {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = unbounded();

        let mut shared = self.shared.write();
        // Replay before registering so the initial value cannot race a
        // concurrent set() into a duplicate delivery.
        let _ = sender.send(shared.current.clone());
        shared.subscribers.push(Subscriber { id, sender });

        ValueSubscription { id, receiver }
    }

    /// Remove a subscriber. Unknown IDs are a no-op, so calling this more
    /// than once for the same subscription is harmless.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.shared.write().subscribers.retain(|sub| sub.id != id);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.read().subscribers.len()
    }
}

/// Handle to a [`BroadcastStore`] subscription.
///
/// Values arrive on an unbounded channel; the first received value is the
/// store's value at subscribe time.
pub struct ValueSubscription<T> {
    id: SubscriberId,
    receiver: Receiver<T>,
}

impl<T> ValueSubscription<T> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next value (blocking).
    pub fn recv(&self) -> Result<T, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a value (non-blocking).
    pub fn try_recv(&self) -> Result<T, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<T, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
