// Beacon service - synthetic positions on a fixed timer, independent of the feed
use crate::application::broadcaster::Broadcaster;
use crate::domain::beacon::BeaconCoords;
use crate::domain::channel::Channel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub struct BeaconService {
    broadcaster: Broadcaster,
    period: Duration,
    rng: StdRng,
}

impl BeaconService {
    pub fn new(broadcaster: Broadcaster, period: Duration) -> Self {
        Self::with_rng(broadcaster, period, StdRng::from_entropy())
    }

    pub fn with_rng(broadcaster: Broadcaster, period: Duration, rng: StdRng) -> Self {
        Self {
            broadcaster,
            period,
            rng,
        }
    }

    /// Emit one position per tick, forever
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period_ms = self.period.as_millis() as u64, "beacon started");

        loop {
            ticker.tick().await;
            self.emit();
        }
    }

    pub fn emit(&mut self) -> BeaconCoords {
        let coords = BeaconCoords::random(&mut self.rng);
        if let Err(e) = self.broadcaster.publish(Channel::Coords, &coords) {
            tracing::error!("Failed to encode beacon payload: {}", e);
        }
        coords
    }
}
