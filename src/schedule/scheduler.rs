use crate::observability::metrics;
use crate::schedule::config::{RunTime, ScheduleConfig};
use chrono::{DateTime, Datelike, Days, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The two daily jobs the scheduler drives. Deactivation always fires one
/// minute after settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Settlement,
    Deactivation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Stopped,
    Armed { next_fire: DateTime<Utc> },
}

pub type JobBody = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Clone)]
enum JobCommand {
    Stop,
    Run(ScheduleConfig),
}

/// Timer-driven trigger for the settlement and deactivation jobs.
///
/// One background task per job: arm for the next wall-clock occurrence of
/// the configured time in the configured zone, sleep, fire, rearm. Rearming
/// only happens after the body completes, so the same job can never fire
/// concurrently with itself; a nominal fire time that passed while a body
/// ran is dropped, not queued. Owned by startup wiring; `configure` and
/// `stop` are the only mutators.
pub struct Scheduler {
    settlement: JobHandle,
    deactivation: JobHandle,
}

struct JobHandle {
    command: watch::Sender<JobCommand>,
    state: Arc<RwLock<JobState>>,
    _task: JoinHandle<()>,
}

impl JobHandle {
    fn spawn(kind: JobKind, body: JobBody) -> Self {
        let (command, rx) = watch::channel(JobCommand::Stop);
        let state = Arc::new(RwLock::new(JobState::Stopped));
        let task = tokio::spawn(job_loop(kind, rx, Arc::clone(&state), body));

        JobHandle {
            command,
            state,
            _task: task,
        }
    }

    fn send(&self, command: JobCommand) {
        // Only fails when the job task is gone, in which case there is
        // nothing left to reconfigure.
        let _ = self.command.send(command);
    }

    fn state(&self) -> JobState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler {
    pub fn new(settlement_body: JobBody, deactivation_body: JobBody) -> Self {
        Scheduler {
            settlement: JobHandle::spawn(JobKind::Settlement, settlement_body),
            deactivation: JobHandle::spawn(JobKind::Deactivation, deactivation_body),
        }
    }

    /// Arm (or atomically re-arm) both jobs for `config`. A job that was
    /// already armed drops its pending arm; there are never two arms for
    /// the same job.
    pub fn configure(&self, config: &ScheduleConfig) {
        let mut deactivation = config.clone();
        deactivation.run_time = config.deactivation_run_time();

        self.settlement.send(JobCommand::Run(config.clone()));
        self.deactivation.send(JobCommand::Run(deactivation));

        tracing::info!(
            run_time = %config.run_time,
            time_zone = %config.time_zone,
            off_days = ?config.market_off_days,
            "scheduler configured"
        );
    }

    /// Disarm both jobs. An in-flight firing completes; nothing fires
    /// afterwards until `configure` is called again.
    pub fn stop(&self) {
        self.settlement.send(JobCommand::Stop);
        self.deactivation.send(JobCommand::Stop);
        tracing::info!("scheduler stopped");
    }

    pub fn job_state(&self, kind: JobKind) -> JobState {
        match kind {
            JobKind::Settlement => self.settlement.state(),
            JobKind::Deactivation => self.deactivation.state(),
        }
    }
}

async fn job_loop(
    kind: JobKind,
    mut commands: watch::Receiver<JobCommand>,
    state: Arc<RwLock<JobState>>,
    body: JobBody,
) {
    loop {
        let command = commands.borrow_and_update().clone();
        let config = match command {
            JobCommand::Run(config) => config,
            JobCommand::Stop => {
                set_state(&state, JobState::Stopped);
                if commands.changed().await.is_err() {
                    return;
                }
                continue;
            }
        };

        let next = next_fire(Utc::now(), config.run_time, config.time_zone);
        set_state(&state, JobState::Armed { next_fire: next });
        tracing::debug!(job = ?kind, next_fire = %next, "job armed");

        let delay = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::select! {
            changed = commands.changed() => {
                // Reconfigure or stop: the pending arm is cancelled and the
                // loop re-reads the command.
                if changed.is_err() {
                    return;
                }
            }
            _ = tokio::time::sleep(delay) => {
                let weekday = fire_weekday(next, config.time_zone);
                if config.is_off_day(weekday) {
                    tracing::info!(job = ?kind, weekday, "market off day, firing skipped");
                    metrics::MARKET_OFF_SKIPS.inc();
                } else {
                    tracing::info!(job = ?kind, "job firing");
                    body().await;
                }
            }
        }
    }
}

fn set_state(state: &RwLock<JobState>, value: JobState) {
    *state.write().unwrap_or_else(|e| e.into_inner()) = value;
}

/// Weekday of the fire instant in the schedule's zone, 0 = Sunday.
pub fn fire_weekday(fire: DateTime<Utc>, tz: Tz) -> u8 {
    fire.with_timezone(&tz).weekday().num_days_from_sunday() as u8
}

/// Next occurrence of `run_time` in `tz` strictly after `after`, as a UTC
/// instant. Scans a few days forward so DST gaps (a local time that does
/// not exist) resolve to the next day's occurrence.
pub fn next_fire(after: DateTime<Utc>, run_time: RunTime, tz: Tz) -> DateTime<Utc> {
    let local = after.with_timezone(&tz);

    for offset in 0..3u64 {
        let Some(date) = local.date_naive().checked_add_days(Days::new(offset)) else {
            continue;
        };
        let Some(naive) = date.and_hms_opt(run_time.hour as u32, run_time.minute as u32, 0) else {
            continue;
        };
        if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
            let candidate = candidate.with_timezone(&Utc);
            if candidate > after {
                return candidate;
            }
        }
    }

    // Unreachable for any real zone; arm a day out rather than not at all.
    after + chrono::Duration::days(1)
}
