// Marker tracking - one map marker per aircraft code
use super::flight::FlightCoords;
use super::geo::LatLng;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerIcon {
    pub url: &'static str,
    pub size: (u32, u32),
}

pub const PLANE_ICON: MarkerIcon = MarkerIcon {
    url: "img/plane_icon.svg",
    size: (20, 20),
};

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub icon: MarkerIcon,
    pub title: String,
}

/// What the map widget has to do after an update
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerChange {
    Created {
        identifier: String,
        position: LatLng,
    },
    Moved {
        identifier: String,
        from: LatLng,
        to: LatLng,
    },
}

/// Identifier to marker mapping for one page session.
///
/// Markers are never removed: an aircraft that stops reporting keeps its last
/// position for as long as the session lives.
#[derive(Debug, Default)]
pub struct MarkerTracker {
    markers: HashMap<String, Marker>,
}

impl MarkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or reposition the marker for `identifier`
    pub fn track(&mut self, identifier: &str, position: LatLng) -> MarkerChange {
        match self.markers.get_mut(identifier) {
            Some(marker) => {
                let from = marker.position;
                marker.position = position;
                tracing::debug!(identifier, ?from, to = ?position, "marker moved");
                MarkerChange::Moved {
                    identifier: identifier.to_string(),
                    from,
                    to: position,
                }
            }
            None => {
                self.markers.insert(
                    identifier.to_string(),
                    Marker {
                        position,
                        icon: PLANE_ICON,
                        title: identifier.to_string(),
                    },
                );
                tracing::debug!(identifier, tracked = self.markers.len(), "marker created");
                MarkerChange::Created {
                    identifier: identifier.to_string(),
                    position,
                }
            }
        }
    }

    /// Apply a broadcast payload; payloads without code or position are ignored
    pub fn apply(&mut self, coords: &FlightCoords) -> Option<MarkerChange> {
        match (&coords.icao, coords.lat, coords.lng) {
            (Some(icao), Some(lat), Some(lng)) => Some(self.track(icao, LatLng::new(lat, lng))),
            _ => {
                tracing::debug!(?coords, "incomplete flight payload ignored");
                None
            }
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&Marker> {
        self.markers.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Marker)> {
        self.markers.iter()
    }
}
