use std::sync::Arc;

use crate::db::Database;
use crate::transfer::TransitionEngine;

/// Shared application state for the webhook gateway
pub struct AppState {
    /// Transfer transition engine (owns the store)
    pub engine: TransitionEngine,
    /// PostgreSQL pool wrapper (health checks)
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(engine: TransitionEngine, db: Arc<Database>) -> Self {
        Self { engine, db }
    }
}
