// Point overlay - transient decorated points drawn over the map
//
// Points are kept in arrival order. Eviction only ever trims a prefix, so the
// sequence stays sorted by arrival time.
use super::animation::{self, Circle, FILL, FILL_HOVER};
use super::geo::{LatLng, LayerPoint, Projection};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Space kept around the outermost points so decorations are not clipped
pub const MARGIN: f64 = 20.0;

/// Points older than this are dropped by `remove_old_points`
pub const MAX_POINT_AGE_MS: i64 = 60_000;

/// Stable identity of a point: its coordinate pair, rendered `lat:lng`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey(String);

impl PointKey {
    pub fn new(lat_lng: LatLng) -> Self {
        // -0.0 and 0.0 name the same place
        let lat = if lat_lng.lat == 0.0 { 0.0 } else { lat_lng.lat };
        let lng = if lat_lng.lng == 0.0 { 0.0 } else { lat_lng.lng };
        Self(format!("{}:{}", lat, lng))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint {
    pub lat_lng: LatLng,
    pub arrived_at: DateTime<Utc>,
}

impl OverlayPoint {
    pub fn key(&self) -> PointKey {
        PointKey::new(self.lat_lng)
    }
}

/// Drawing surface placement in layer coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, p: LayerPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn origin(&self) -> LayerPoint {
        LayerPoint::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy)]
struct RawBounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl RawBounds {
    fn at(p: LayerPoint) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    fn extend(mut self, p: LayerPoint) -> Self {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
        self
    }

    fn with_margin(self, margin: f64) -> Bounds {
        Bounds {
            x: self.min_x - margin,
            y: self.min_y - margin,
            width: self.max_x - self.min_x + margin * 2.0,
            height: self.max_y - self.min_y + margin * 2.0,
        }
    }
}

/// Rendered group for one key: main circle plus the arrival ripple
#[derive(Debug, Clone, PartialEq)]
pub struct PointElement {
    pub lat_lng: LatLng,
    pub primary: Circle,
    pub ripple: Option<Circle>,
    /// Fade-out in progress; the group is dropped when it completes
    pub exit: Option<animation::Tween>,
    /// Offset inside the drawing surface, set by the position refresh
    pub transform: Option<LayerPoint>,
}

impl PointElement {
    fn enter(lat_lng: LatLng, now: DateTime<Utc>) -> Self {
        Self {
            lat_lng,
            primary: animation::primary_circle(now),
            ripple: Some(animation::ripple_circle(now)),
            exit: None,
            transform: None,
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.exit.is_some()
    }
}

/// Outcome of diffing the element set against the point sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub entered: Vec<PointKey>,
    pub exited: Vec<PointKey>,
    pub retained: Vec<PointKey>,
}

#[derive(Debug)]
pub struct PointOverlay {
    points: VecDeque<OverlayPoint>,
    elements: HashMap<PointKey, PointElement>,
    bounds: Bounds,
}

impl PointOverlay {
    pub fn new<P: Projection + ?Sized>(projection: &P) -> Self {
        let mut overlay = Self {
            points: VecDeque::new(),
            elements: HashMap::new(),
            bounds: RawBounds::at(LayerPoint::new(0.0, 0.0)).with_margin(MARGIN),
        };
        overlay.update(projection);
        overlay
    }

    pub fn add_point<P: Projection + ?Sized>(
        &mut self,
        lat_lng: LatLng,
        now: DateTime<Utc>,
        projection: &P,
    ) -> Reconciliation {
        self.add_points([lat_lng], now, projection)
    }

    /// Append points, create their decorations and grow the surface to fit
    pub fn add_points<P, I>(&mut self, points: I, now: DateTime<Utc>, projection: &P) -> Reconciliation
    where
        P: Projection + ?Sized,
        I: IntoIterator<Item = LatLng>,
    {
        // A clock stepping backwards must not break the arrival ordering
        let arrived_at = match self.points.back() {
            Some(last) if last.arrived_at > now => last.arrived_at,
            _ => now,
        };

        for lat_lng in points {
            self.points.push_back(OverlayPoint { lat_lng, arrived_at });
        }

        let reconciliation = self.update_markers(now);
        self.update(projection);
        reconciliation
    }

    /// Diff the keyed element set against the current points
    pub fn update_markers(&mut self, now: DateTime<Utc>) -> Reconciliation {
        let mut reconciliation = Reconciliation::default();

        let mut seen = HashSet::new();
        let mut wanted = Vec::new();
        for point in &self.points {
            let key = point.key();
            if seen.insert(key.clone()) {
                wanted.push((key, point.lat_lng));
            }
        }

        for (key, element) in self.elements.iter_mut() {
            if !element.is_exiting() && !seen.contains(key) {
                element.exit = Some(animation::fade_out(now));
                reconciliation.exited.push(key.clone());
            }
        }
        reconciliation.exited.sort();

        for (key, lat_lng) in wanted {
            let live = self.elements.get(&key).is_some_and(|e| !e.is_exiting());
            if live {
                reconciliation.retained.push(key);
            } else {
                // A key coming back while fading out gets a fresh group
                self.elements.insert(key.clone(), PointElement::enter(lat_lng, now));
                reconciliation.entered.push(key);
            }
        }

        if !reconciliation.entered.is_empty() || !reconciliation.exited.is_empty() {
            tracing::trace!(
                entered = reconciliation.entered.len(),
                exited = reconciliation.exited.len(),
                retained = reconciliation.retained.len(),
                "overlay reconciled"
            );
        }

        reconciliation
    }

    /// Recompute bounds, move the surface, and reposition every element inside it
    pub fn update<P: Projection + ?Sized>(&mut self, projection: &P) {
        self.bounds = self.compute_bounds(projection);

        let origin = self.bounds.origin();
        for element in self.elements.values_mut() {
            let p = projection.lat_lng_to_layer_point(element.lat_lng);
            element.transform = Some(p - origin);
        }
    }

    fn compute_bounds<P: Projection + ?Sized>(&self, projection: &P) -> Bounds {
        let mut projected = self
            .points
            .iter()
            .map(|point| projection.lat_lng_to_layer_point(point.lat_lng));

        let raw = match projected.next() {
            Some(first) => projected.fold(RawBounds::at(first), RawBounds::extend),
            None => RawBounds::at(LayerPoint::new(0.0, 0.0)),
        };

        raw.with_margin(MARGIN)
    }

    /// Drop every point older than the age threshold. Must be called periodically by the owner.
    pub fn remove_old_points<P: Projection + ?Sized>(&mut self, now: DateTime<Utc>, projection: &P) -> usize {
        let cutoff = self
            .points
            .iter()
            .position(|p| (now - p.arrived_at).num_milliseconds() <= MAX_POINT_AGE_MS)
            .unwrap_or(self.points.len());

        if cutoff > 0 {
            self.points.drain(..cutoff);
            self.update_markers(now);
            self.update(projection);
        }

        cutoff
    }

    /// Keep only the `n` most recent points
    pub fn leave_only_n_points<P: Projection + ?Sized>(
        &mut self,
        n: usize,
        now: DateTime<Utc>,
        projection: &P,
    ) -> usize {
        let excess = self.points.len().saturating_sub(n);
        self.points.drain(..excess);
        self.update_markers(now);
        self.update(projection);
        excess
    }

    /// Pointer entered or left the main circle of `key`
    pub fn set_hover(&mut self, key: &PointKey, hovered: bool) -> bool {
        match self.elements.get_mut(key) {
            Some(element) => {
                element.primary.fill = if hovered { FILL_HOVER } else { FILL };
                if hovered {
                    tracing::debug!(%key, "point hovered");
                }
                true
            }
            None => false,
        }
    }

    /// Detach finished ripples and fully faded groups. Returns the number of groups removed.
    pub fn advance(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.elements.len();

        for element in self.elements.values_mut() {
            if element.ripple.as_ref().is_some_and(|r| r.tween.is_finished(now)) {
                element.ripple = None;
            }
        }
        self.elements
            .retain(|_, element| !element.exit.as_ref().is_some_and(|exit| exit.is_finished(now)));

        before - self.elements.len()
    }

    pub fn points(&self) -> impl Iterator<Item = &OverlayPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn element(&self, key: &PointKey) -> Option<&PointElement> {
        self.elements.get(key)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
