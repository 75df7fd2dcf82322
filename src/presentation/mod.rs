// Presentation layer - HTTP and websocket surface
pub mod app_state;
pub mod handlers;
pub mod router;
