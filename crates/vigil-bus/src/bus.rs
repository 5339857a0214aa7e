// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation subscriber registry with non-blocking delivery.
//!
//! The registry is the only shared mutable state. `publish` takes the read
//! lock and attempts a `try_send` per subscriber; `subscribe` and `cancel`
//! take the write lock. The lock is never held across an `.await`.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use vigil_core::ExecutionEvent;

/// Queue capacity per subscriber when none is configured.
pub const DEFAULT_QUEUE_SIZE: usize = 64;

type Subscribers = HashMap<u64, mpsc::Sender<ExecutionEvent>>;

#[derive(Default)]
struct Registry {
    conversations: RwLock<HashMap<String, Subscribers>>,
    next_id: AtomicU64,
}

impl Registry {
    fn remove(&self, conversation_id: &str, id: u64) {
        let mut conversations = self
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(subscribers) = conversations.get_mut(conversation_id) {
            subscribers.remove(&id);
            if subscribers.is_empty() {
                conversations.remove(conversation_id);
            }
        }
    }
}

/// In-memory publish/subscribe hub keyed by conversation id.
///
/// Cloning is cheap; clones share one registry.
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<Registry>,
    queue_size: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_SIZE)
    }
}

impl EventBus {
    /// A bus whose subscribers each buffer at most `queue_size` events.
    /// A zero size is raised to one.
    pub fn new(queue_size: usize) -> Self {
        Self {
            registry: Arc::new(Registry::default()),
            queue_size: queue_size.max(1),
        }
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    /// Deliver `event` to every current subscriber of its conversation.
    ///
    /// Returns how many subscribers accepted it. Full or closed queues are
    /// skipped; the producer is never blocked.
    pub fn publish(&self, event: ExecutionEvent) -> usize {
        let conversations = self
            .registry
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = conversations.get(&event.conversation_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (id, sender) in subscribers {
            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        conversation_id = %event.conversation_id,
                        subscriber = id,
                        event = event.payload.name(),
                        "subscriber queue full, dropping event"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        conversation_id = %event.conversation_id,
                        subscriber = id,
                        "subscriber gone before cancel"
                    );
                }
            }
        }
        delivered
    }

    /// Register a new listener for `conversation_id`.
    ///
    /// The returned [`CancelHandle`] can be cloned and used from anywhere;
    /// dropping the [`Subscription`] cancels as well.
    pub fn subscribe(&self, conversation_id: impl Into<String>) -> (Subscription, CancelHandle) {
        let conversation_id = conversation_id.into();
        let (sender, receiver) = mpsc::channel(self.queue_size);
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);

        let subscribers = {
            let mut conversations = self
                .registry
                .conversations
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let subscribers = conversations.entry(conversation_id.clone()).or_default();
            subscribers.insert(id, sender);
            subscribers.len()
        };
        debug!(conversation_id = %conversation_id, subscriber = id, subscribers, "subscribed");

        let cancel = CancelHandle {
            registry: Arc::clone(&self.registry),
            conversation_id,
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        let subscription = Subscription {
            receiver,
            cancel: cancel.clone(),
        };
        (subscription, cancel)
    }

    /// Live subscribers for one conversation.
    pub fn subscriber_count(&self, conversation_id: &str) -> usize {
        self.registry
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(conversation_id)
            .map_or(0, HashMap::len)
    }

    /// Conversations with at least one live subscriber.
    pub fn conversation_count(&self) -> usize {
        self.registry
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Removes one subscriber from the registry. Idempotent.
#[derive(Clone)]
pub struct CancelHandle {
    registry: Arc<Registry>,
    conversation_id: String,
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.registry.remove(&self.conversation_id, self.id);
        debug!(conversation_id = %self.conversation_id, subscriber = self.id, "unsubscribed");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("conversation_id", &self.conversation_id)
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// The receiving end of one subscription, in publish order.
///
/// Yields nothing after cancellation, even events already queued.
pub struct Subscription {
    receiver: mpsc::Receiver<ExecutionEvent>,
    cancel: CancelHandle,
}

impl Subscription {
    /// Next event, or `None` once cancelled.
    pub async fn recv(&mut self) -> Option<ExecutionEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let event = self.receiver.recv().await?;
        (!self.cancel.is_cancelled()).then_some(event)
    }

    /// Next already-queued event without waiting.
    pub fn try_recv(&mut self) -> Option<ExecutionEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }
}

impl Stream for Subscription {
    type Item = ExecutionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
