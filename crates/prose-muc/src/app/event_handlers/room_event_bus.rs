// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::app::event_handlers::{RoomEvent, RoomEventType};
use crate::domain::shared::models::{RoomId, SubscriberId};

pub type RoomEventCallback = Arc<dyn Fn(&RoomEvent) + Send + Sync>;

#[derive(Clone)]
struct Subscriber {
    id: SubscriberId,
    callback: RoomEventCallback,
}

/// Per-room publish/subscribe registry.
///
/// Callbacks run synchronously on the publishing thread, in subscription order. `publish` invokes
/// them on a snapshot of the subscriber list without holding any lock, so a callback may
/// subscribe, unsubscribe or publish again.
#[derive(Clone)]
pub struct RoomEventBus {
    inner: Arc<RoomEventBusInner>,
}

struct RoomEventBusInner {
    room_id: RoomId,
    subscribers: RwLock<HashMap<RoomEventType, Arc<Vec<Subscriber>>>>,
}

impl RoomEventBus {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            inner: Arc::new(RoomEventBusInner {
                room_id,
                subscribers: Default::default(),
            }),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.inner.room_id
    }

    /// Registers `callback` for `event_type`. If `id` is subscribed to `event_type` already, its
    /// callback is replaced and keeps its position.
    pub fn subscribe(
        &self,
        event_type: RoomEventType,
        id: impl Into<SubscriberId>,
        callback: impl Fn(&RoomEvent) + Send + Sync + 'static,
    ) {
        let subscriber = Subscriber {
            id: id.into(),
            callback: Arc::new(callback),
        };

        let mut guard = self.inner.subscribers.write();
        let subscribers = Arc::make_mut(guard.entry(event_type).or_default());

        if let Some(existing) = subscribers.iter_mut().find(|s| s.id == subscriber.id) {
            debug!(
                room = %self.inner.room_id,
                event = %event_type,
                "Replacing callback of subscriber '{}'.",
                subscriber.id
            );
            existing.callback = subscriber.callback;
            return;
        }

        subscribers.push(subscriber);
    }

    pub fn unsubscribe(&self, event_type: RoomEventType, id: &SubscriberId) {
        let mut guard = self.inner.subscribers.write();

        let Some(subscribers) = guard.get_mut(&event_type) else {
            debug!(
                room = %self.inner.room_id,
                event = %event_type,
                "Cannot unsubscribe '{}'. No subscribers registered.",
                id
            );
            return;
        };

        let Some(idx) = subscribers.iter().position(|s| &s.id == id) else {
            debug!(
                room = %self.inner.room_id,
                event = %event_type,
                "Cannot unsubscribe unknown subscriber '{}'.",
                id
            );
            return;
        };

        Arc::make_mut(subscribers).remove(idx);

        if subscribers.is_empty() {
            guard.remove(&event_type);
        }
    }

    pub fn publish(&self, event: &RoomEvent) {
        let event_type = event.event_type();

        let Some(subscribers) = self.inner.subscribers.read().get(&event_type).cloned() else {
            debug!(
                room = %self.inner.room_id,
                event = %event_type,
                "No subscribers for event."
            );
            return;
        };

        for subscriber in subscribers.iter() {
            (subscriber.callback)(event)
        }
    }

    pub fn subscribers_count(&self, event_type: RoomEventType) -> usize {
        self.inner
            .subscribers
            .read()
            .get(&event_type)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

impl Debug for RoomEventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomEventBus")
            .field("room_id", &self.inner.room_id)
            .finish_non_exhaustive()
    }
}
