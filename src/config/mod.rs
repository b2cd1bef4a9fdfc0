use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::AppConfig;

/// Fallback schedule used when nothing has been persisted yet, and when the
/// schedule read fails at startup (degraded mode).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScheduleDefaults {
    pub run_time: String,
    pub time_zone: String,
    pub market_off_days: Vec<u8>,
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        ScheduleDefaults {
            run_time: "06:00".to_string(),
            time_zone: "Asia/Kolkata".to_string(),
            market_off_days: vec![6, 0], // Saturday, Sunday
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApiConfig {
    pub bind_addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}
