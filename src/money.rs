//! Fixed-point money.
//!
//! Every amount in the engine is a [`Money`]: an `i64` holding the real
//! value multiplied by [`SCALE`] (four decimal digits).  Rates are Money
//! too, expressed as fractions, so 5% is `Money::from_raw(500)`.  No
//! floating point is used anywhere.  Arithmetic does not detect
//! overflow and wraps; the `checked_*` variants exist for callers that
//! take amounts from outside.
//!
//! Parsing follows Indonesian conventions (`1.234.567,89`) and is
//! deliberately lenient: [`Money::parse_id`] returns zero for anything it
//! cannot read.  Use the [`FromStr`] implementation when the reason for
//! a failure matters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;
use thousands::Separable;

/// Scale factor between real amounts and the stored integer.
pub const SCALE: i64 = 10_000;

/// Number of decimal digits carried by [`SCALE`].
pub const DECIMALS: usize = 4;

/// A monetary amount (or rate fraction) scaled by [`SCALE`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

/// Why a string could not be read as Indonesian-formatted money.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("input is empty")]
    Empty,
    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),
    #[error("more than one decimal separator")]
    MultipleDecimalSeparators,
    #[error("no digits before the decimal separator")]
    MissingWholePart,
    #[error("no digits after the decimal separator")]
    MissingFraction,
    #[error("thousands separator out of place")]
    MisplacedSeparator,
    #[error("amount does not fit in the fixed-point range")]
    Overflow,
}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest representable amount; used as the "infinity" ceiling of
    /// every rate table.
    pub const MAX: Money = Money(i64::MAX);

    /// Wraps an already-scaled integer.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Money(raw)
    }

    /// The scaled integer.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Scales a whole currency amount.
    #[inline]
    pub const fn from_whole(whole: i64) -> Self {
        Money(whole.wrapping_mul(SCALE))
    }

    /// Builds `whole + frac / SCALE`.  `frac` is already in scaled units
    /// and is not range checked: `from_whole_and_fraction(1, 12_000)` is
    /// the same as `from_whole_and_fraction(2, 2_000)`.
    #[inline]
    pub const fn from_whole_and_fraction(whole: i64, frac: i64) -> Self {
        Money(whole * SCALE + frac)
    }

    /// Whole currency units, truncated toward zero.
    pub const fn whole(self) -> i64 {
        self.0 / SCALE
    }

    /// Fractional digits in scaled units, always non-negative.
    pub const fn fraction(self) -> i64 {
        (self.0 % SCALE).abs()
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a rate fraction and rescales once.  Truncates toward
    /// zero.
    pub fn mul(self, rate: Money) -> Money {
        let product = i128::from(self.0) * i128::from(rate.0) / i128::from(SCALE);
        Money(product as i64)
    }

    /// Multiplies by a plain integer; no rescaling.  Wraps on overflow.
    pub fn mul_int(self, k: i64) -> Money {
        Money(self.0.wrapping_mul(k))
    }

    pub fn checked_mul_int(self, k: i64) -> Option<Money> {
        self.0.checked_mul(k).map(Money)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Divides by a plain integer, truncating toward zero.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero, like integer division.
    pub fn div(self, divisor: i64) -> Money {
        Money(self.0 / divisor)
    }

    /// `self × numerator / denominator`, multiplying first.
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is zero.
    pub fn percent(self, numerator: i64, denominator: i64) -> Money {
        let value = i128::from(self.0) * i128::from(numerator) / i128::from(denominator);
        Money(value as i64)
    }

    /// Truncates the unscaled amount to a multiple of 1000 currency units.
    pub fn round_down_thousand(self) -> Money {
        const UNIT: i64 = 1_000 * SCALE;
        Money(self.0 / UNIT * UNIT)
    }

    /// Lenient Indonesian parser.  Returns [`Money::ZERO`] for any input
    /// that [`FromStr`] rejects, so "0" and "garbage" are
    /// indistinguishable to the caller.
    pub fn parse_id(input: &str) -> Money {
        match input.parse() {
            Ok(money) => money,
            Err(err) => {
                tracing::debug!(input, error = %err, "unparseable amount, defaulting to zero");
                Money::ZERO
            }
        }
    }

    /// [`Money::parse_id`] for bindings that may hand over no string at all.
    pub fn parse_id_opt(input: Option<&str>) -> Money {
        input.map_or(Money::ZERO, Money::parse_id)
    }

    /// Renders in Indonesian format with every decimal kept, e.g.
    /// `1.234.567,8900`.  The output parses back to the same value.
    pub fn to_id_string(self) -> String {
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / SCALE as u64;
        let frac = magnitude % SCALE as u64;
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{},{frac:0width$}", whole.separate_with_dots(), width = DECIMALS)
    }

    /// Renders a rate fraction as a percentage: `500` is `5%`, `25` is
    /// `0,25%`.
    pub fn to_percent_string(self) -> String {
        let hundredths = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = hundredths / 100;
        let frac = hundredths % 100;
        if frac == 0 {
            format!("{sign}{whole}%")
        } else {
            let digits = format!("{frac:02}");
            format!("{sign}{whole},{}%", digits.trim_end_matches('0'))
        }
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    #[inline]
    fn neg(self) -> Money {
        Money(self.0.wrapping_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / SCALE as u64,
            magnitude % SCALE as u64,
            width = DECIMALS
        )
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Strict Indonesian parser: `.` groups thousands, `,` separates
    /// decimals, an optional leading `-`, surrounding whitespace ignored.
    /// When the whole part is grouped, the first group has one to three
    /// digits and every later group exactly three.  Decimals beyond the
    /// fourth are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseMoneyError::Empty);
        }
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut parts = body.split(',');
        let whole_part = parts.next().unwrap_or_default();
        let frac_part = parts.next();
        if parts.next().is_some() {
            return Err(ParseMoneyError::MultipleDecimalSeparators);
        }

        // i128 so that i64::MIN, whose magnitude has no positive i64, parses.
        let mut whole: i128 = 0;
        let mut whole_digits = 0usize;
        let grouped = whole_part.contains('.');
        for (index, group) in whole_part.split('.').enumerate() {
            for c in group.chars() {
                let digit = c.to_digit(10).ok_or(ParseMoneyError::InvalidCharacter(c))?;
                whole = whole
                    .checked_mul(10)
                    .and_then(|w| w.checked_add(i128::from(digit)))
                    .ok_or(ParseMoneyError::Overflow)?;
            }
            let placed = match (grouped, index) {
                (false, _) => true,
                (true, 0) => (1..=3).contains(&group.len()),
                (true, _) => group.len() == 3,
            };
            if !placed {
                return Err(ParseMoneyError::MisplacedSeparator);
            }
            whole_digits += group.len();
        }
        if whole_digits == 0 {
            return Err(ParseMoneyError::MissingWholePart);
        }

        let mut frac: i64 = 0;
        if let Some(digits) = frac_part {
            if digits.is_empty() {
                return Err(ParseMoneyError::MissingFraction);
            }
            let mut taken = 0usize;
            for c in digits.chars() {
                let digit = c.to_digit(10).ok_or(ParseMoneyError::InvalidCharacter(c))?;
                if taken < DECIMALS {
                    frac = frac * 10 + i64::from(digit);
                    taken += 1;
                }
            }
            for _ in taken..DECIMALS {
                frac *= 10;
            }
        }

        let magnitude = whole
            .checked_mul(i128::from(SCALE))
            .and_then(|w| w.checked_add(i128::from(frac)))
            .ok_or(ParseMoneyError::Overflow)?;
        let raw = if negative { -magnitude } else { magnitude };
        i64::try_from(raw).map(Money).map_err(|_| ParseMoneyError::Overflow)
    }
}
