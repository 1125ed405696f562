use std::sync::Arc;
use std::time::Duration;

use crate::services::ScheduleController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ScheduleController>,
    /// Pause before the assistant answers.
    pub assistant_delay: Duration,
}

impl AppState {
    pub fn new(controller: Arc<ScheduleController>, assistant_delay: Duration) -> Self {
        Self {
            controller,
            assistant_delay,
        }
    }
}
