use crate::types::balance::Balance;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const PERCENT_DECIMALS: i64 = 100; // stored as hundredths of a percent

/// Percentage with two decimal places, stored as integer hundredths.
/// Fixed-point so settlement statistics stay deterministic; f64 only at
/// the serialization edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(i64);

impl Percent {
    pub fn zero() -> Self {
        Percent(0)
    }

    pub fn from_hundredths(value: i64) -> Self {
        Percent(value)
    }

    pub fn hundredths(&self) -> i64 {
        self.0
    }

    pub fn from_f64(value: f64) -> Self {
        Percent((value * PERCENT_DECIMALS as f64).round() as i64)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / PERCENT_DECIMALS as f64
    }

    /// Profit as a percentage of the balance it was computed against,
    /// rounded half-away-from-zero to two decimals.
    ///
    /// A zero previous balance cannot be divided by; the outcome keeps the
    /// sign semantics instead: +100% for a gain, -100% for a loss.
    pub fn of(profit: Balance, previous_balance: Balance) -> Self {
        if previous_balance.is_zero() {
            return if profit.is_positive() {
                Percent(100 * PERCENT_DECIMALS)
            } else if profit.is_negative() {
                Percent(-100 * PERCENT_DECIMALS)
            } else {
                Percent(0)
            };
        }

        // (profit / previous) * 100, in hundredths: profit * 10_000 / previous
        let numerator = profit.to_i64() as i128 * 100 * PERCENT_DECIMALS as i128;
        Percent(round_div(numerator, previous_balance.to_i64() as i128))
    }
}

/// Integer division rounded half away from zero, saturating at the i64
/// bounds for pathological ratios.
fn round_div(numerator: i128, denominator: i128) -> i64 {
    let sign = numerator.signum() * denominator.signum();
    let quotient = (2 * numerator.abs() + denominator.abs()) / (2 * denominator.abs());
    i64::try_from(sign * quotient)
        .unwrap_or(if sign < 0 { i64::MIN } else { i64::MAX })
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Percent::from_f64(value))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}
