// Application state for HTTP handlers
use crate::application::broadcaster::Broadcaster;

#[derive(Clone)]
pub struct AppState {
    pub broadcaster: Broadcaster,
}
