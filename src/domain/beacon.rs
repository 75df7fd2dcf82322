// Beacon domain model - synthetic coordinates for the `coords` channel
use rand::Rng;
use serde::{Deserialize, Serialize};

const LAT_CENTER: f64 = 37.0;
const LAT_SPREAD: f64 = 10.0;
const LNG_CENTER: f64 = -96.0;
const LNG_SPREAD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeaconCoords {
    pub lat: f64,
    pub lng: f64,
}

impl BeaconCoords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Draw a position over the continental US box the demo page looks at
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            lat: LAT_CENTER + rng.gen_range(-LAT_SPREAD..LAT_SPREAD),
            lng: LNG_CENTER + rng.gen_range(-LNG_SPREAD..LNG_SPREAD),
        }
    }
}
