use crate::engine::ShadeEngine;

/// Shared server state. The engine is stateless and internally reference
/// counted, so no locking is needed.
pub struct AppState {
    pub engine: ShadeEngine,
}
