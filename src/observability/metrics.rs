use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, HistogramOpts, IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Settlement cycle metrics
    pub static ref SETTLEMENT_CYCLES: Counter = Counter::new(
        "settlement_cycles_total",
        "Total number of settlement cycles run"
    ).unwrap();

    pub static ref SETTLEMENT_ACCOUNTS_PROCESSED: Counter = Counter::new(
        "settlement_accounts_processed_total",
        "Total number of participating accounts examined"
    ).unwrap();

    pub static ref SETTLEMENT_ACCOUNTS_UPDATED: Counter = Counter::new(
        "settlement_accounts_updated_total",
        "Total number of accounts whose balance was settled"
    ).unwrap();

    pub static ref SETTLEMENT_ACCOUNTS_FAILED: Counter = Counter::new(
        "settlement_accounts_failed_total",
        "Total number of accounts skipped because of store errors"
    ).unwrap();

    pub static ref SETTLEMENT_LAST_DELTA: IntGauge = IntGauge::new(
        "settlement_last_cycle_delta",
        "Net balance delta applied by the most recent cycle, in base units"
    ).unwrap();

    pub static ref SETTLEMENT_CYCLE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "settlement_cycle_duration_seconds",
            "Settlement cycle duration"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0])
    ).unwrap();

    // Scheduler metrics
    pub static ref MARKET_OFF_SKIPS: Counter = Counter::new(
        "scheduler_market_off_skips_total",
        "Scheduled firings suppressed by the market-off-day calendar"
    ).unwrap();

    // Deactivation metrics
    pub static ref DEACTIVATED_ACCOUNTS: Counter = Counter::new(
        "deactivated_accounts_total",
        "Total number of accounts auto-deactivated after settlement"
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(SETTLEMENT_CYCLES.clone())).unwrap();
    REGISTRY.register(Box::new(SETTLEMENT_ACCOUNTS_PROCESSED.clone())).unwrap();
    REGISTRY.register(Box::new(SETTLEMENT_ACCOUNTS_UPDATED.clone())).unwrap();
    REGISTRY.register(Box::new(SETTLEMENT_ACCOUNTS_FAILED.clone())).unwrap();
    REGISTRY.register(Box::new(SETTLEMENT_LAST_DELTA.clone())).unwrap();
    REGISTRY.register(Box::new(SETTLEMENT_CYCLE_DURATION.clone())).unwrap();
    REGISTRY.register(Box::new(MARKET_OFF_SKIPS.clone())).unwrap();
    REGISTRY.register(Box::new(DEACTIVATED_ACCOUNTS.clone())).unwrap();
}
