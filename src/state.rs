//! Shared application state for all routes.

use crate::store::HandleProvider;

#[derive(Clone)]
pub struct AppState {
    /// Selected once at startup: per-request file handles in production,
    /// one shared in-memory handle in test mode.
    pub provider: HandleProvider,
}
