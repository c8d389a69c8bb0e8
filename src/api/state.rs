use crate::services::Monitor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub monitor: Monitor,
}

impl AppState {
    pub fn new(monitor: Monitor) -> Self {
        Self { monitor }
    }
}
