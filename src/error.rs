use thiserror::Error;
use crate::types::balance::Balance;
use crate::types::ids::{AccountId, RuleId};

#[derive(Error, Debug)]
pub enum Error {
    // Schedule Validation Errors
    #[error("Invalid run time '{0}': expected HH:mm with hours 0-23, minutes 0-59")]
    InvalidRunTime(String),

    #[error("Invalid market off day {0}: expected 0-6 (0 = Sunday)")]
    InvalidMarketOffDay(i64),

    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),

    // Rule Table Errors
    #[error("Invalid rule range: min={min}, max={max}")]
    InvalidRuleRange { min: Balance, max: Balance },

    #[error("Rule range [{min}, {max}] overlaps active rule {existing}")]
    RuleRangeOverlap {
        min: Balance,
        max: Balance,
        existing: RuleId,
    },

    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),

    // Account Errors
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(AccountId),

    // Settlement Errors
    #[error("Settlement engine is halted")]
    EngineHalted,

    #[error("Overflow in {operation}")]
    Overflow { operation: String },

    // Infrastructure Errors
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Rejections that leave state untouched and are the caller's fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidRunTime(_)
                | Error::InvalidMarketOffDay(_)
                | Error::InvalidTimeZone(_)
                | Error::InvalidRuleRange { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::RuleRangeOverlap { .. } | Error::AccountAlreadyExists(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RuleNotFound(_) | Error::AccountNotFound(_))
    }
}
