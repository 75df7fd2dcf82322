// Map session - client-side state driven by socket messages and map events
use crate::domain::beacon::BeaconCoords;
use crate::domain::channel::{Channel, ChannelMessage};
use crate::domain::flight::FlightCoords;
use crate::domain::geo::{LatLng, MapView};
use crate::domain::marker::{MarkerChange, MarkerTracker};
use crate::domain::overlay::{PointOverlay, Reconciliation};
use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Marker(MarkerChange),
    Overlay(Reconciliation),
    Ignored,
}

/// Everything one open map page owns: the view, the aircraft markers and the point overlay
pub struct MapSession<C: Clock = SystemClock> {
    view: MapView,
    markers: MarkerTracker,
    overlay: PointOverlay,
    clock: C,
}

impl MapSession<SystemClock> {
    pub fn new(view: MapView) -> Self {
        Self::with_clock(view, SystemClock)
    }
}

impl<C: Clock> MapSession<C> {
    pub fn with_clock(view: MapView, clock: C) -> Self {
        let overlay = PointOverlay::new(&view);
        Self {
            view,
            markers: MarkerTracker::new(),
            overlay,
            clock,
        }
    }

    /// Handle one text frame received from the relay
    pub fn handle_text(&mut self, text: &str) -> serde_json::Result<SessionEvent> {
        let message = ChannelMessage::decode(text)?;
        self.handle_message(message)
    }

    pub fn handle_message(&mut self, message: ChannelMessage) -> serde_json::Result<SessionEvent> {
        let event = match message.event {
            Channel::FlightCoords => {
                let coords: FlightCoords = serde_json::from_value(message.data)?;
                match self.markers.apply(&coords) {
                    Some(change) => SessionEvent::Marker(change),
                    None => SessionEvent::Ignored,
                }
            }
            Channel::Coords => {
                let coords: BeaconCoords = serde_json::from_value(message.data)?;
                let now = self.clock.now();
                SessionEvent::Overlay(self.overlay.add_point(
                    LatLng::new(coords.lat, coords.lng),
                    now,
                    &self.view,
                ))
            }
        };
        Ok(event)
    }

    /// Change zoom; the overlay is re-laid out once the zoom has ended
    pub fn zoom_to(&mut self, zoom: f64) {
        self.view.zoom_to(zoom);
        self.on_zoom_end();
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.view.set_view(center, zoom);
        self.on_zoom_end();
    }

    fn on_zoom_end(&mut self) {
        self.overlay.update(&self.view);
    }

    pub fn remove_old_points(&mut self) -> usize {
        let now = self.clock.now();
        self.overlay.remove_old_points(now, &self.view)
    }

    pub fn leave_only_n_points(&mut self, n: usize) -> usize {
        let now = self.clock.now();
        self.overlay.leave_only_n_points(n, now, &self.view)
    }

    /// Let finished animations detach their elements
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now();
        self.overlay.advance(now)
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn markers(&self) -> &MarkerTracker {
        &self.markers
    }

    pub fn overlay(&self) -> &PointOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut PointOverlay {
        &mut self.overlay
    }
}
