pub mod controller;
pub mod scheduler;

pub use controller::{LoadStats, ScheduleController, ScheduleState};
pub use scheduler::ReloadScheduler;
