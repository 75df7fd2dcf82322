// Broadcaster - fan-out of pre-serialized frames to every connected client
use crate::domain::channel::{Channel, encode_message};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type Frame = Arc<str>;

#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Frame>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish without waiting on anyone. Returns how many clients got the frame.
    pub fn publish<T: Serialize>(&self, channel: Channel, data: &T) -> serde_json::Result<usize> {
        let text = encode_message(channel, data)?;
        // No receivers is not an error: the frame is simply dropped
        Ok(self.tx.send(Frame::from(text)).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::beacon::BeaconCoords;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let broadcaster = Broadcaster::new(8);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();

        let delivered = broadcaster
            .publish(Channel::Coords, &BeaconCoords::new(1.0, 2.0))
            .unwrap();

        assert_eq!(delivered, 2);
        let expected = r#"{"event":"coords","data":{"lat":1.0,"lng":2.0}}"#;
        assert_eq!(&*a.recv().await.unwrap(), expected);
        assert_eq!(&*b.recv().await.unwrap(), expected);
    }

    #[test]
    fn test_publish_without_clients_is_dropped() {
        let broadcaster = Broadcaster::new(8);
        let delivered = broadcaster
            .publish(Channel::Coords, &BeaconCoords::new(1.0, 2.0))
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_slow_client_lags_instead_of_blocking() {
        let broadcaster = Broadcaster::new(2);
        let mut slow = broadcaster.subscribe();

        for i in 0..5 {
            broadcaster
                .publish(Channel::Coords, &BeaconCoords::new(i as f64, 0.0))
                .unwrap();
        }

        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert!(slow.recv().await.unwrap().contains(r#""lat":3.0"#));
    }
}
