use crate::schedule::config::ScheduleConfig;
use tokio::sync::RwLock;

/// Singleton holder for the currently-effective schedule. Administrative
/// updates replace the whole record; readers always see the most recent
/// write.
pub struct ScheduleStore {
    current: RwLock<ScheduleConfig>,
}

impl ScheduleStore {
    pub fn new(initial: ScheduleConfig) -> Self {
        ScheduleStore {
            current: RwLock::new(initial),
        }
    }

    pub async fn current(&self) -> ScheduleConfig {
        self.current.read().await.clone()
    }

    pub async fn replace(&self, config: ScheduleConfig) {
        *self.current.write().await = config;
    }

    /// Replace the schedule and run `apply` on the new value while still
    /// holding the write guard. Concurrent updates cannot interleave between
    /// the write and its side effect, so whatever config was written last is
    /// also the one last applied.
    pub async fn replace_with(&self, config: ScheduleConfig, apply: impl FnOnce(&ScheduleConfig)) {
        let mut current = self.current.write().await;
        apply(&config);
        *current = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::config::RunTime;

    #[tokio::test]
    async fn replace_takes_effect_for_next_read() {
        let store = ScheduleStore::new(ScheduleConfig::default_with_tz(chrono_tz::UTC));

        let mut updated = store.current().await;
        updated.run_time = RunTime::parse("07:30").unwrap();
        store.replace(updated.clone()).await;

        assert_eq!(store.current().await, updated);
    }

    #[tokio::test]
    async fn concurrent_replaces_keep_store_and_applied_config_together() {
        use std::sync::{Arc, Mutex};

        let store = Arc::new(ScheduleStore::new(ScheduleConfig::default_with_tz(chrono_tz::UTC)));
        let applied = Arc::new(Mutex::new(ScheduleConfig::default_with_tz(chrono_tz::UTC)));

        for round in 0..100u8 {
            let mut first = store.current().await;
            first.run_time = RunTime::new(round % 24, 15).unwrap();
            let mut second = first.clone();
            second.run_time = RunTime::new(round % 24, 45).unwrap();

            let update = |config: ScheduleConfig| {
                let store = Arc::clone(&store);
                let applied = Arc::clone(&applied);
                async move {
                    store
                        .replace_with(config, |c| *applied.lock().unwrap() = c.clone())
                        .await;
                }
            };
            tokio::join!(update(first), update(second));

            // Whichever write won, the applied config must match it.
            assert_eq!(store.current().await, *applied.lock().unwrap());
        }
    }
}
