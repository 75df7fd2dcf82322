// Application layer - use cases and the seams to external collaborators
pub mod beacon_service;
pub mod broadcaster;
pub mod change_feed;
pub mod map_session;
pub mod relay_service;
