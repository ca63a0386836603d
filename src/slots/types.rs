use std::{fmt, str::FromStr};

use num_bigint::BigInt;

/// Beacon chain slot number.
///
/// Backed by an arbitrary-precision integer so that parsing never overflows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Slot(BigInt);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert \"{0}\" to a slot")]
pub struct ParseSlotError(pub String);

impl Slot {
    pub fn zero() -> Self {
        Self::default()
    }
}

impl FromStr for Slot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseSlotError(s.to_string()));
        }

        BigInt::from_str(s)
            .map(Slot)
            .map_err(|_| ParseSlotError(s.to_string()))
    }
}

impl From<u64> for Slot {
    fn from(value: u64) -> Self {
        Slot(BigInt::from(value))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
