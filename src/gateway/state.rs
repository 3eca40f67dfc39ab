use std::sync::Arc;

use crate::db::Database;
use crate::workflow::IntakeService;

/// Shared gateway state.
pub struct AppState {
    pub intake: IntakeService,
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(intake: IntakeService, db: Arc<Database>) -> Self {
        Self { intake, db }
    }
}
