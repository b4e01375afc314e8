//! 내부 이벤트 버스.
//!
//! 컨트롤러의 [`SyncEvent`]를 `tokio::broadcast`로 화면 갱신 루프에 전달한다.

use opsboard_sync::controller::SyncEvent;
use tokio::sync::broadcast;
use tracing::debug;

pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 이벤트 발행
    pub fn publish(&self, event: SyncEvent) {
        debug!("이벤트 발행: {:?}", std::mem::discriminant(&event));
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// 컨트롤러에 넘길 송신측 복제
    pub fn sender(&self) -> broadcast::Sender<SyncEvent> {
        self.tx.clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_sync::store::Collection;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SyncEvent::ConnectionChanged(true));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SyncEvent::ConnectionChanged(true)));
    }

    #[tokio::test]
    async fn sender_reaches_all_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let _ = bus.sender().send(SyncEvent::Reloaded(Collection::Events));

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert!(matches!(e1, SyncEvent::Reloaded(Collection::Events)));
        assert!(matches!(e2, SyncEvent::Reloaded(Collection::Events)));
    }
}
