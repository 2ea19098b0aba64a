use serde::Serialize;
use tokio::sync::broadcast;

/// One mutation against a watched collection, published so list screens can
/// refetch. Mirrors the table subscriptions the frontends used to hold
/// against the hosted backend.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub collection: &'static str,
    pub op: ChangeOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// In-process fanout. Best-effort: a subscriber that lags gets dropped
/// events and carries on, which the refetch-everything consumers tolerate.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventBus { tx }
    }

    pub fn publish(&self, collection: &'static str, op: ChangeOp, id: Option<String>) {
        let event = ChangeEvent { collection, op, id };
        log::debug!("Publishing change event: {:?}", event);
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish("rides", ChangeOp::Insert, Some("abc".to_string()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.collection, "rides");
        assert_eq!(event.id.as_deref(), Some("abc"));
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::new(8);
        bus.publish("bookings", ChangeOp::Update, None);
    }
}
