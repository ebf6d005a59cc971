use derive_more::{Add, Deref, From, Into};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sun per TRX, the fixed scale between the smallest unit and the major unit
pub const SUN_PER_TRX: u64 = 1_000_000;

const TRX_DECIMALS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amount has more than 6 decimal places: {0}")]
    TooPrecise(String),

    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

/// TRX amount, counted in sun
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Add,
    From,
    Into,
    Deref,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const ONE_SUN: Amount = Amount(1);
    pub const ONE_TRX: Amount = Amount(SUN_PER_TRX);

    pub const fn from_sun(sun: u64) -> Self {
        Self(sun)
    }

    pub const fn as_sun(&self) -> u64 {
        self.0
    }

    /// Create from a TRX value, rounded to the nearest sun.
    /// Prefer [`Amount::from_trx_str`] for user input; floats only belong in presentation.
    pub fn from_trx(trx: f64) -> Result<Self, AmountError> {
        if !trx.is_finite() || trx < 0.0 {
            return Err(AmountError::Invalid(trx.to_string()));
        }
        let sun = (trx * SUN_PER_TRX as f64).round();
        if sun > u64::MAX as f64 {
            return Err(AmountError::OutOfRange(trx.to_string()));
        }
        Ok(Self(sun as u64))
    }

    /// Parse a decimal TRX string such as `"1.266"` exactly
    pub fn from_trx_str(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if frac.len() > TRX_DECIMALS {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::OutOfRange(s.to_string()))?
        };
        let frac: u64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac, width = TRX_DECIMALS)
                .parse()
                .map_err(|_| AmountError::Invalid(s.to_string()))?
        };

        whole
            .checked_mul(SUN_PER_TRX)
            .and_then(|sun| sun.checked_add(frac))
            .map(Self)
            .ok_or_else(|| AmountError::OutOfRange(s.to_string()))
    }

    pub fn as_trx(&self) -> f64 {
        self.0 as f64 / SUN_PER_TRX as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Self(self.0.saturating_sub(other.0))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_trx_str(s)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:06} TRX",
            self.0 / SUN_PER_TRX,
            self.0 % SUN_PER_TRX
        )
    }
}
