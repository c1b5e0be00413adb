//! Named event bus: `emit` validates the event name against the
//! catalog, then dispatches synchronously to in-process subscribers.
//! Hook/webhook dispatch never blocks the emitter -- subscribers that
//! wrap those engines spawn their own work and return immediately.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::shared::error::EventBusError;

use super::catalog::EventCatalog;

pub type EventPayload = HashMap<String, Value>;
pub type EventSubscriber = Arc<dyn Fn(String, EventPayload) -> BoxFuture<'static, ()> + Send + Sync>;

pub struct NamedEventBus {
    catalog: EventCatalog,
    subscribers: RwLock<HashMap<String, Vec<EventSubscriber>>>,
}

impl NamedEventBus {
    pub fn new(catalog: EventCatalog) -> Self {
        Self { catalog, subscribers: RwLock::new(HashMap::new()) }
    }

    pub async fn subscribe(&self, event_name: &str, subscriber: EventSubscriber) -> Result<(), EventBusError> {
        if !self.catalog.is_known(event_name) {
            return Err(EventBusError::UnknownEvent(event_name.to_string()));
        }
        self.subscribers.write().await.entry(event_name.to_string()).or_default().push(subscriber);
        Ok(())
    }

    /// Dispatches `event_name`/`payload` to every in-process subscriber,
    /// in registration order, awaiting each in turn.
    pub async fn emit(&self, event_name: &str, payload: EventPayload) -> Result<(), EventBusError> {
        if !self.catalog.is_known(event_name) {
            return Err(EventBusError::UnknownEvent(event_name.to_string()));
        }

        let subscribers = self.subscribers.read().await.get(event_name).cloned().unwrap_or_default();
        if subscribers.is_empty() {
            return Ok(());
        }

        for subscriber in subscribers {
            subscriber(event_name.to_string(), payload.clone()).await;
        }
        Ok(())
    }

    pub async fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers.read().await.get(event_name).map(|v| v.len()).unwrap_or(0)
    }
}

/// Convenience for building a one-key payload inline at call sites.
pub fn payload(pairs: &[(&str, Value)]) -> EventPayload {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn emit_rejects_unknown_event_names() {
        let bus = NamedEventBus::new(EventCatalog::known());
        let result = bus.emit("not_a_real_event", HashMap::new()).await;
        assert!(matches!(result, Err(EventBusError::UnknownEvent(_))));
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_payload() {
        let bus = NamedEventBus::new(EventCatalog::known());
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        bus.subscribe(
            "job_completed",
            Arc::new(move |_name, _payload| {
                let seen = seen_clone.clone();
                Box::pin(async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                })
            }),
        )
        .await
        .unwrap();

        bus.emit("job_completed", payload(&[("job_id", Value::String("abc".to_string()))])).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
