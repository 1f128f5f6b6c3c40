//! Observation dispatcher — process-wide fan-out from sessions to sinks.
//!
//! Subscriptions are keyed by [`ProfileKind`] and outlive individual
//! sessions, so a consumer registered before the first connection keeps
//! receiving after every reconnect. There is no replay: a late subscriber
//! only sees observations dispatched after it registered.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;

use wearsync_domain::id::SubscriptionId;
use wearsync_domain::observation::Observation;
use wearsync_domain::profile::ProfileKind;

use crate::ports::MeasurementSink;

type Subscriber = (SubscriptionId, Arc<dyn MeasurementSink>);

/// Ordered per-kind subscriber lists.
///
/// Delivery copies the subscriber list under a read lock and releases it
/// before calling any sink, so sinks may subscribe or unsubscribe from
/// within `deliver` without deadlocking.
#[derive(Default)]
pub struct ObservationDispatcher {
    subscribers: RwLock<HashMap<ProfileKind, Vec<Subscriber>>>,
}

impl ObservationDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` for one kind. Sinks are called in registration
    /// order.
    pub fn subscribe(&self, kind: ProfileKind, sink: impl MeasurementSink + 'static) -> SubscriptionId {
        self.subscribe_shared(kind, Arc::new(sink))
    }

    /// Register an already shared sink for one kind.
    pub fn subscribe_shared(&self, kind: ProfileKind, sink: Arc<dyn MeasurementSink>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.write()
            .entry(kind)
            .or_default()
            .push((id, sink));
        tracing::debug!(%kind, subscription = %id, "sink subscribed");
        id
    }

    /// Register `sink` for every kind under a single id.
    pub fn subscribe_all(&self, sink: impl MeasurementSink + 'static) -> SubscriptionId {
        let sink: Arc<dyn MeasurementSink> = Arc::new(sink);
        let id = SubscriptionId::new();
        let mut subscribers = self.write();
        for kind in ProfileKind::ALL {
            subscribers
                .entry(kind)
                .or_default()
                .push((id, Arc::clone(&sink)));
        }
        tracing::debug!(subscription = %id, "sink subscribed to all profiles");
        id
    }

    /// Subscribe an async consumer: observations of `kind` are forwarded
    /// to the returned receiver.
    pub fn subscribe_channel(
        &self,
        kind: ProfileKind,
    ) -> (SubscriptionId, mpsc::UnboundedReceiver<Observation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.subscribe(kind, tx), rx)
    }

    /// Remove every registration made under `id`. Returns whether
    /// anything was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for list in self.write().values_mut() {
            let before = list.len();
            list.retain(|(sub_id, _)| *sub_id != id);
            removed |= list.len() != before;
        }
        if removed {
            tracing::debug!(subscription = %id, "sink unsubscribed");
        }
        removed
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: ProfileKind) -> usize {
        self.read().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `observation` to every sink registered for its kind.
    ///
    /// Returns how many sinks accepted it. Sink failures are logged and
    /// never propagate to the caller.
    pub fn dispatch(&self, observation: &Observation) -> usize {
        let kind = observation.kind();
        let snapshot: Vec<Subscriber> = self.read().get(&kind).cloned().unwrap_or_default();

        let mut delivered = 0;
        for (id, sink) in snapshot {
            match sink.deliver(observation) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(%err, %kind, subscription = %id, "sink rejected observation");
                }
            }
        }
        delivered
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ProfileKind, Vec<Subscriber>>> {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ProfileKind, Vec<Subscriber>>> {
        self.subscribers.write().unwrap_or_else(PoisonError::into_inner)
    }
}
