// Geographic primitives and the map view projection
use std::f64::consts::PI;
use std::ops::Sub;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

pub const DEFAULT_CENTER: LatLng = LatLng { lat: 20.0, lng: 0.0 };
pub const DEFAULT_ZOOM: f64 = 2.5;
pub const MAX_ZOOM: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Pixel position relative to the map's layer origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPoint {
    pub x: f64,
    pub y: f64,
}

impl LayerPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for LayerPoint {
    type Output = LayerPoint;

    fn sub(self, rhs: LayerPoint) -> LayerPoint {
        LayerPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Converts geographic coordinates to screen space at the current pan/zoom
pub trait Projection {
    fn lat_lng_to_layer_point(&self, lat_lng: LatLng) -> LayerPoint;
}

/// Spherical mercator view with a fixed viewport size
#[derive(Debug, Clone)]
pub struct MapView {
    center: LatLng,
    zoom: f64,
    viewport: (f64, f64),
    pixel_origin: LayerPoint,
}

impl MapView {
    pub fn new(center: LatLng, zoom: f64, viewport: (f64, f64)) -> Self {
        let mut view = Self {
            center,
            zoom: zoom.clamp(0.0, MAX_ZOOM),
            viewport,
            pixel_origin: LayerPoint::new(0.0, 0.0),
        };
        view.reset_origin();
        view
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom.clamp(0.0, MAX_ZOOM);
        self.reset_origin();
    }

    pub fn zoom_to(&mut self, zoom: f64) {
        self.set_view(self.center, zoom);
    }

    /// World pixel coordinates at the current zoom
    fn project(&self, lat_lng: LatLng) -> LayerPoint {
        let scale = TILE_SIZE * 2f64.powf(self.zoom);
        let lat = lat_lng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = scale * (lat_lng.lng / 360.0 + 0.5);
        let y = scale * (0.5 - (PI / 4.0 + lat / 2.0).tan().ln() / (2.0 * PI));
        LayerPoint::new(x, y)
    }

    fn reset_origin(&mut self) {
        let center = self.project(self.center);
        self.pixel_origin = LayerPoint::new(
            (center.x - self.viewport.0 / 2.0).round(),
            (center.y - self.viewport.1 / 2.0).round(),
        );
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM, (1024.0, 768.0))
    }
}

impl Projection for MapView {
    fn lat_lng_to_layer_point(&self, lat_lng: LatLng) -> LayerPoint {
        let p = self.project(lat_lng);
        LayerPoint::new(p.x.round(), p.y.round()) - self.pixel_origin
    }
}
