//! Application state for the web server.

use std::sync::Arc;

use mantoux::Engine;

/// Shared application state.
///
/// The engine handles its own interior locking; handlers only ever hold
/// this cheaply-cloned wrapper.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
