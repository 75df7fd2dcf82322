// Animation timelines for overlay decorations
use chrono::{DateTime, Utc};

/// Length of a transition that does not set its own duration
pub const DEFAULT_DURATION_MS: u32 = 250;

pub const STROKE_PRIMARY: &str = "black";
pub const STROKE_RIPPLE: &str = "grey";
pub const FILL: &str = "green";
pub const FILL_HOVER: &str = "blue";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub radius: f64,
    pub opacity: f64,
}

/// One leg of a chained transition. `None` leaves the attribute where it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub duration_ms: u32,
    pub radius: Option<f64>,
    pub opacity: Option<f64>,
}

impl Keyframe {
    pub fn radius(duration_ms: u32, radius: f64) -> Self {
        Self {
            duration_ms,
            radius: Some(radius),
            opacity: None,
        }
    }

    pub fn fade(duration_ms: u32, opacity: f64) -> Self {
        Self {
            duration_ms,
            radius: None,
            opacity: Some(opacity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub started_at: DateTime<Utc>,
    pub keyframes: Vec<Keyframe>,
    /// The element is detached once the last keyframe completes
    pub remove_on_end: bool,
}

impl Tween {
    pub fn new(started_at: DateTime<Utc>, keyframes: Vec<Keyframe>, remove_on_end: bool) -> Self {
        Self {
            started_at,
            keyframes,
            remove_on_end,
        }
    }

    pub fn total_ms(&self) -> i64 {
        self.keyframes.iter().map(|k| k.duration_ms as i64).sum()
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        (now - self.started_at).num_milliseconds() >= self.total_ms()
    }

    /// Style at `now`, starting from `initial`, with cubic in-out easing per leg
    pub fn sample(&self, initial: Style, now: DateTime<Utc>) -> Style {
        let mut elapsed = (now - self.started_at).num_milliseconds().max(0) as f64;
        let mut from = initial;

        for keyframe in &self.keyframes {
            let to = Style {
                radius: keyframe.radius.unwrap_or(from.radius),
                opacity: keyframe.opacity.unwrap_or(from.opacity),
            };
            let duration = keyframe.duration_ms as f64;
            if elapsed < duration {
                let t = ease_cubic_in_out(elapsed / duration);
                return Style {
                    radius: from.radius + (to.radius - from.radius) * t,
                    opacity: from.opacity + (to.opacity - from.opacity) * t,
                };
            }
            elapsed -= duration;
            from = to;
        }

        from
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub stroke: &'static str,
    pub fill: &'static str,
    pub initial: Style,
    pub tween: Tween,
}

impl Circle {
    pub fn style_at(&self, now: DateTime<Utc>) -> Style {
        self.tween.sample(self.initial, now)
    }
}

/// Main circle: grows past its resting size, then settles at radius 7
pub fn primary_circle(now: DateTime<Utc>) -> Circle {
    Circle {
        stroke: STROKE_PRIMARY,
        fill: FILL,
        initial: Style {
            radius: 0.0,
            opacity: 0.6,
        },
        tween: Tween::new(
            now,
            vec![Keyframe::radius(350, 10.0), Keyframe::radius(150, 7.0)],
            false,
        ),
    }
}

/// Outer pulse that expands to radius 20 while fading, then detaches itself
pub fn ripple_circle(now: DateTime<Utc>) -> Circle {
    Circle {
        stroke: STROKE_RIPPLE,
        fill: FILL,
        initial: Style {
            radius: 0.0,
            opacity: 0.5,
        },
        tween: Tween::new(
            now,
            vec![
                Keyframe::radius(350, 10.0),
                Keyframe {
                    duration_ms: 300,
                    radius: Some(20.0),
                    opacity: Some(0.0),
                },
            ],
            true,
        ),
    }
}

pub fn fade_out(now: DateTime<Utc>) -> Tween {
    Tween::new(now, vec![Keyframe::fade(DEFAULT_DURATION_MS, 0.0)], true)
}
