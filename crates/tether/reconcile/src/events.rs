//! Per-operation event emission

use tether_types::{TetherEvent, TetherEventEnvelope};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Publishes events of one operation under a shared correlation id
///
/// Sending never fails the operation: events are dropped when nobody is
/// subscribed.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<TetherEventEnvelope>,
    correlation_id: String,
}

impl EventSink {
    pub fn new(tx: broadcast::Sender<TetherEventEnvelope>) -> Self {
        Self {
            tx,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    /// Sink with its own channel and no subscribers
    pub fn detached() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self::new(tx)
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn emit(&self, event: TetherEvent) {
        let envelope = TetherEventEnvelope::new(event).with_correlation(self.correlation_id.clone());
        let _ = self.tx.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_types::ApiId;

    #[test]
    fn test_events_share_correlation_id() {
        let (tx, mut rx) = broadcast::channel(8);
        let sink = EventSink::new(tx);

        sink.emit(TetherEvent::RoutesCleared {
            api_id: ApiId::new("abc"),
            count: 2,
        });
        sink.emit(TetherEvent::ApiRemoved {
            api_id: ApiId::new("abc"),
        });

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.correlation_id.as_deref(), Some(sink.correlation_id()));
        assert_eq!(first.correlation_id, second.correlation_id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_emit_without_subscribers() {
        EventSink::detached().emit(TetherEvent::ConvergeFailed {
            reason: "nobody listening".into(),
        });
    }
}
