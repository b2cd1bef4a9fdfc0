use axum::{
    Router,
    routing::{get, post, put, delete},
    extract::{Path, State, Json},
    http::StatusCode,
};
use crate::error::Error;
use crate::interfaces::account_store::AccountStore;
use crate::observability::metrics;
use crate::rules::{ProfitRule, RuleTable};
use crate::schedule::{JobKind, JobState, RunTime, ScheduleConfig, ScheduleStore, Scheduler};
use crate::settlement::{DeactivationEngine, DeactivationSummary, SettlementEngine, SettlementSummary};
use crate::types::balance::Balance;
use crate::types::ids::RuleId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ApiState {
    pub accounts: Arc<RwLock<Box<dyn AccountStore>>>,
    pub rules: Arc<RwLock<RuleTable>>,
    pub schedule: Arc<ScheduleStore>,
    pub scheduler: Arc<Scheduler>,
    pub settlement: Arc<SettlementEngine>,
    pub deactivation: Arc<DeactivationEngine>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/schedule", get(get_schedule))
        .route("/schedule", put(update_schedule))
        .route("/rules", get(list_rules))
        .route("/rules", post(create_rule))
        .route("/rules/:id", put(update_rule))
        .route("/rules/:id", delete(delete_rule))
        .route("/rules/:id/toggle", post(toggle_rule))
        .route("/settlement/run", post(trigger_settlement))
        .route("/deactivation/run", post(trigger_deactivation))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics_text() -> Result<String, StatusCode> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&metrics::REGISTRY.gather(), &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Serialize)]
struct ApiMessage {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    market_off_days: Option<Vec<u8>>,
}

impl ApiMessage {
    fn failure(message: impl Into<String>) -> Self {
        ApiMessage {
            success: false,
            message: message.into(),
            market_off_days: None,
        }
    }
}

/// Administrative callers get structured rejections; the status code mirrors
/// the error taxonomy.
fn status_for(error: &Error) -> StatusCode {
    if error.is_validation() {
        StatusCode::BAD_REQUEST
    } else if error.is_conflict() {
        StatusCode::CONFLICT
    } else if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn reject(error: Error) -> (StatusCode, Json<ApiMessage>) {
    (status_for(&error), Json(ApiMessage::failure(error.to_string())))
}

// ---- Schedule ----

#[derive(Serialize)]
struct ScheduleView {
    settlement_time: String,
    deactivation_time: String,
    time_zone: String,
    market_off_days: Vec<u8>,
    market_off_day_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_settlement_fire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_deactivation_fire: Option<String>,
}

async fn get_schedule(State(state): State<Arc<ApiState>>) -> Json<ScheduleView> {
    let config = state.schedule.current().await;

    let next_fire = |kind| match state.scheduler.job_state(kind) {
        JobState::Armed { next_fire } => Some(next_fire.to_rfc3339()),
        JobState::Stopped => None,
    };

    Json(ScheduleView {
        settlement_time: config.run_time.to_string(),
        deactivation_time: config.deactivation_run_time().to_string(),
        time_zone: config.time_zone.to_string(),
        market_off_days: config.market_off_days.iter().copied().collect(),
        market_off_day_names: config.off_day_names(),
        next_settlement_fire: next_fire(JobKind::Settlement),
        next_deactivation_fire: next_fire(JobKind::Deactivation),
    })
}

#[derive(Deserialize)]
struct UpdateScheduleRequest {
    time: String,
    time_zone: String,
    market_off_days: Option<Vec<i64>>,
}

async fn update_schedule(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<ApiMessage>, (StatusCode, Json<ApiMessage>)> {
    let run_time = RunTime::parse(&req.time).map_err(reject)?;
    let time_zone = ScheduleConfig::parse_time_zone(&req.time_zone).map_err(reject)?;

    let off_days: Vec<i64> = match req.market_off_days {
        Some(days) => days,
        None => {
            // Omitted off-days keep the currently-effective calendar.
            let current = state.schedule.current().await;
            current.market_off_days.iter().map(|&d| d as i64).collect()
        }
    };

    let config = ScheduleConfig::new(run_time, time_zone, off_days).map_err(reject)?;

    // Persist and re-arm under one write guard: concurrent updates cannot
    // leave the scheduler armed for a config that is no longer current.
    state
        .schedule
        .replace_with(config.clone(), |c| state.scheduler.configure(c))
        .await;

    Ok(Json(ApiMessage {
        success: true,
        message: format!("Schedule updated to {} {}", config.run_time, config.time_zone),
        market_off_days: Some(config.market_off_days.iter().copied().collect()),
    }))
}

// ---- Rules ----

#[derive(Deserialize)]
struct RuleRequest {
    min_balance: i64,
    max_balance: i64,
    profit_amount: i64,
}

async fn list_rules(State(state): State<Arc<ApiState>>) -> Json<Vec<ProfitRule>> {
    Json(state.rules.read().await.list().to_vec())
}

async fn create_rule(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<RuleRequest>,
) -> Result<(StatusCode, Json<ProfitRule>), (StatusCode, Json<ApiMessage>)> {
    let rule = state
        .rules
        .write()
        .await
        .create(
            Balance::from_i64(req.min_balance),
            Balance::from_i64(req.max_balance),
            Balance::from_i64(req.profit_amount),
        )
        .map_err(reject)?;

    Ok((StatusCode::CREATED, Json(rule)))
}

async fn update_rule(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(req): Json<RuleRequest>,
) -> Result<Json<ProfitRule>, (StatusCode, Json<ApiMessage>)> {
    let rule_id = parse_rule_id(&id)?;
    let rule = state
        .rules
        .write()
        .await
        .update(
            rule_id,
            Balance::from_i64(req.min_balance),
            Balance::from_i64(req.max_balance),
            Balance::from_i64(req.profit_amount),
        )
        .map_err(reject)?;

    Ok(Json(rule))
}

async fn delete_rule(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, (StatusCode, Json<ApiMessage>)> {
    let rule_id = parse_rule_id(&id)?;
    state.rules.write().await.delete(rule_id).map_err(reject)?;

    Ok(Json(ApiMessage {
        success: true,
        message: format!("Rule {} deleted", rule_id),
        market_off_days: None,
    }))
}

async fn toggle_rule(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfitRule>, (StatusCode, Json<ApiMessage>)> {
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rules.write().await.toggle(rule_id).map_err(reject)?;
    Ok(Json(rule))
}

fn parse_rule_id(id: &str) -> Result<RuleId, (StatusCode, Json<ApiMessage>)> {
    RuleId::from_string(id)
        .map_err(|_| (StatusCode::BAD_REQUEST, Json(ApiMessage::failure(format!("Invalid rule id: {}", id)))))
}

// ---- Manual triggers ----

async fn trigger_settlement(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SettlementSummary>, (StatusCode, Json<ApiMessage>)> {
    let mut store = state.accounts.write().await;
    let summary = state
        .settlement
        .run(store.as_mut())
        .await
        .map_err(reject)?;

    Ok(Json(summary))
}

async fn trigger_deactivation(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DeactivationSummary>, (StatusCode, Json<ApiMessage>)> {
    let mut store = state.accounts.write().await;
    let summary = state.deactivation.run(store.as_mut()).map_err(reject)?;

    Ok(Json(summary))
}
