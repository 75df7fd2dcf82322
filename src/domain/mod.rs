// Domain layer - wire payloads and map-side bookkeeping
pub mod animation;
pub mod beacon;
pub mod channel;
pub mod flight;
pub mod geo;
pub mod marker;
pub mod overlay;
