pub mod config;
pub mod scheduler;
pub mod store;

pub use config::{RunTime, ScheduleConfig};
pub use scheduler::{JobKind, JobState, Scheduler};
pub use store::ScheduleStore;
