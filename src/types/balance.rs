use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub};
use std::fmt;

/// Signed currency amount in base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(i64);

impl Balance {
    pub fn from_i64(value: i64) -> Self {
        Balance(value)
    }

    pub fn to_i64(&self) -> i64 {
        self.0
    }

    pub fn zero() -> Self {
        Balance(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn abs(&self) -> Self {
        Balance(self.0.abs())
    }

    pub fn checked_add(&self, other: Balance) -> Option<Balance> {
        self.0.checked_add(other.0).map(Balance)
    }

    pub fn saturating_add(&self, other: Balance) -> Balance {
        Balance(self.0.saturating_add(other.0))
    }
}

impl Add for Balance {
    type Output = Balance;
    fn add(self, other: Balance) -> Balance {
        Balance(self.0 + other.0)
    }
}

impl Sub for Balance {
    type Output = Balance;
    fn sub(self, other: Balance) -> Balance {
        Balance(self.0 - other.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, other: Balance) {
        self.0 += other.0;
    }
}

impl Neg for Balance {
    type Output = Balance;
    fn neg(self) -> Balance {
        Balance(-self.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
