//! Fixed-point money handling shared across the DAO, DTO, and payment layers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minor units (pence) per major unit (pound).
const MINOR_PER_MAJOR: i64 = 100;

/// A non-negative monetary amount in minor currency units.
///
/// Prices cross the API boundary as decimal major-unit values and are
/// converted exactly once, rounding half-up at the minor-unit boundary.
/// Everything downstream (persistence, checkout line items) works on the
/// integer minor-unit value, so there is no float arithmetic anywhere in the
/// money path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

/// Failures when converting a decimal amount into a [`Price`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The input contained no digits at all.
    #[error("amount is empty")]
    Empty,
    /// The input contained a character outside `[0-9.+-]`.
    #[error("amount `{0}` is not a plain decimal number")]
    Malformed(String),
    /// The amount was negative; prices are non-negative by definition.
    #[error("amount `{0}` is negative")]
    Negative(String),
    /// The amount does not fit in 64-bit minor units.
    #[error("amount `{0}` is out of range")]
    OutOfRange(String),
}

impl Price {
    /// Wrap an amount already expressed in minor units.
    pub fn from_minor_units(minor: i64) -> Self {
        Self(minor)
    }

    /// Parse a decimal major-unit amount, rounding half-up at the minor-unit
    /// boundary: `"4.995"` → 500, `"5.004"` → 500.
    pub fn parse_major(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        let malformed = || MoneyError::Malformed(trimmed.to_owned());

        let (negative, unsigned) = match trimmed.split_at_checked(1) {
            Some(("-", rest)) => (true, rest),
            Some(("+", rest)) => (false, rest),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (unsigned, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| MoneyError::OutOfRange(trimmed.to_owned()))?
        };

        let frac = frac_part.as_bytes();
        let digit = |index: usize| frac.get(index).map_or(0, |b| i64::from(b - b'0'));
        // Two fractional digits land inside the minor unit; the third decides
        // the rounding direction (>= 5 rounds away from zero, i.e. half-up
        // for the non-negative amounts accepted here).
        let mut minor_fraction = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            minor_fraction += 1;
        }

        let minor = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|scaled| scaled.checked_add(minor_fraction))
            .ok_or_else(|| MoneyError::OutOfRange(trimmed.to_owned()))?;

        if negative && minor != 0 {
            return Err(MoneyError::Negative(trimmed.to_owned()));
        }

        Ok(Self(minor))
    }

    /// The amount in minor units (pence).
    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_PER_MAJOR,
            self.0 % MINOR_PER_MAJOR
        )
    }
}
