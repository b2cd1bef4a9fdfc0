use tracing::Span;
use crate::types::ids::UserId;

pub fn settlement_cycle_span() -> Span {
    tracing::info_span!("settlement_cycle")
}

pub fn account_settlement_span(user_id: &UserId) -> Span {
    tracing::debug_span!(
        "account_settlement",
        user_id = %user_id,
    )
}
