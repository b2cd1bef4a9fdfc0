use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use SettleInfra::api::rest::{ApiState, create_router};
use SettleInfra::config::{AppConfig, ScheduleDefaults};
use SettleInfra::interfaces::account_store::AccountStore;
use SettleInfra::observability::metrics;
use SettleInfra::rules::RuleTable;
use SettleInfra::schedule::{ScheduleConfig, ScheduleStore, Scheduler};
use SettleInfra::schedule::scheduler::JobBody;
use SettleInfra::settlement::{DeactivationEngine, InMemoryAccounts, SettlementEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let env = std::env::var("SETTLEINFRA_ENV").unwrap_or_else(|_| "default".to_string());
    let app_config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "config load failed, continuing with built-in defaults");
            AppConfig::default()
        }
    };

    metrics::register_metrics();

    let schedule_config = initial_schedule(&app_config.schedule);
    let schedule = Arc::new(ScheduleStore::new(schedule_config.clone()));

    let accounts: Arc<RwLock<Box<dyn AccountStore>>> =
        Arc::new(RwLock::new(Box::new(InMemoryAccounts::new())));
    let rules = Arc::new(RwLock::new(RuleTable::new()));
    let settlement = Arc::new(SettlementEngine::new(Arc::clone(&rules)));
    let deactivation = Arc::new(DeactivationEngine::new());

    let scheduler = Arc::new(Scheduler::new(
        settlement_body(Arc::clone(&accounts), Arc::clone(&settlement)),
        deactivation_body(Arc::clone(&accounts), Arc::clone(&deactivation)),
    ));
    scheduler.configure(&schedule_config);

    let state = Arc::new(ApiState {
        accounts,
        rules,
        schedule,
        scheduler,
        settlement,
        deactivation,
    });

    let listener = tokio::net::TcpListener::bind(&app_config.api.bind_addr).await?;
    tracing::info!(addr = %app_config.api.bind_addr, "listening");
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}

/// Build the startup schedule from configuration. A bad or missing value
/// is an explicit degraded-mode transition to the documented defaults, not
/// a crash: silently never running the daily settlement would be worse than
/// running it on default parameters.
fn initial_schedule(defaults: &ScheduleDefaults) -> ScheduleConfig {
    let time_zone = match ScheduleConfig::parse_time_zone(&defaults.time_zone) {
        Ok(tz) => tz,
        Err(e) => {
            tracing::warn!(error = %e, "degraded mode: falling back to UTC");
            chrono_tz::UTC
        }
    };

    let parsed = SettleInfra::schedule::RunTime::parse(&defaults.run_time).and_then(|run_time| {
        ScheduleConfig::new(
            run_time,
            time_zone,
            defaults.market_off_days.iter().map(|&d| d as i64),
        )
    });

    match parsed {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "degraded mode: falling back to default schedule");
            ScheduleConfig::default_with_tz(time_zone)
        }
    }
}

fn settlement_body(
    accounts: Arc<RwLock<Box<dyn AccountStore>>>,
    engine: Arc<SettlementEngine>,
) -> JobBody {
    Arc::new(move || {
        let accounts = Arc::clone(&accounts);
        let engine = Arc::clone(&engine);
        async move {
            let mut store = accounts.write().await;
            if let Err(e) = engine.run(store.as_mut()).await {
                tracing::error!(error = %e, "scheduled settlement run failed");
            }
        }
        .boxed()
    })
}

fn deactivation_body(
    accounts: Arc<RwLock<Box<dyn AccountStore>>>,
    engine: Arc<DeactivationEngine>,
) -> JobBody {
    Arc::new(move || {
        let accounts = Arc::clone(&accounts);
        let engine = Arc::clone(&engine);
        async move {
            let mut store = accounts.write().await;
            if let Err(e) = engine.run(store.as_mut()) {
                tracing::error!(error = %e, "scheduled deactivation run failed");
            }
        }
        .boxed()
    })
}
