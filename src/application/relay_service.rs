// Relay service - re-broadcast every matching database change to all clients
use crate::application::broadcaster::Broadcaster;
use crate::application::change_feed::{ChangeFeed, FeedError, FeedFilter};
use crate::domain::channel::Channel;
use crate::domain::flight::{ChangeEvent, FlightCoords};
use futures::StreamExt;
use std::sync::Arc;

#[derive(Clone)]
pub struct RelayService {
    feed: Arc<dyn ChangeFeed>,
    filter: FeedFilter,
    broadcaster: Broadcaster,
}

impl RelayService {
    pub fn new(feed: Arc<dyn ChangeFeed>, filter: FeedFilter, broadcaster: Broadcaster) -> Self {
        Self {
            feed,
            filter,
            broadcaster,
        }
    }

    /// Subscribe and relay until the feed ends or fails. There is no reconnect.
    pub async fn run(&self) -> Result<(), FeedError> {
        let mut changes = self.feed.subscribe(&self.filter).await?;
        tracing::info!(
            field = %self.filter.field,
            value = %self.filter.value,
            "subscribed to change feed"
        );

        while let Some(item) = changes.next().await {
            match item {
                Ok(event) => {
                    self.relay(event);
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping change: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!("change feed closed by server");
        Ok(())
    }

    /// Transform one change and publish it on `flight_coords`
    pub fn relay(&self, event: ChangeEvent) -> Option<FlightCoords> {
        tracing::info!(?event, "change observed");

        let Some(coords) = event.into_coords() else {
            tracing::debug!("change without new value (deletion), nothing to broadcast");
            return None;
        };

        match self.broadcaster.publish(Channel::FlightCoords, &coords) {
            Ok(clients) => {
                tracing::debug!(?coords, clients, "-> flight_coords");
            }
            Err(e) => {
                tracing::error!("Failed to encode flight payload: {}", e);
            }
        }

        Some(coords)
    }
}
