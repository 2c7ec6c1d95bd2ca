//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) so that monthly totals and limit
//! comparisons are exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Largest number of integer digits accepted by [`Money::parse_amount`]
pub const MAX_INTEGER_DIGITS: usize = 9;

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use walletbook::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from dollars and cents
    pub const fn from_dollars_cents(dollars: i64, cents: i64) -> Self {
        Self(dollars * 100 + cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole dollars portion (truncated toward zero)
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Scale by a rate given in hundredths of a percent, rounding half up
    /// to the nearest cent.
    ///
    /// ```
    /// use walletbook::models::Money;
    /// // 1.5% of $200.00
    /// assert_eq!(Money::from_cents(20000).scale_basis_points(150).cents(), 300);
    /// ```
    pub const fn scale_basis_points(&self, basis_points: u32) -> Self {
        let scaled = self.0 as i128 * basis_points as i128;
        let rounded = (scaled + 5_000) / 10_000;
        Self(rounded as i64)
    }

    /// Parse a user-entered amount
    ///
    /// Accepts "10", "10.5", "10.50" and "$10.50". Rejects negative values,
    /// more than nine integer digits and more than two decimal places.
    pub fn parse_amount(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        let s = trimmed.strip_prefix('$').unwrap_or(trimmed);

        if s.starts_with('-') {
            return Err(MoneyParseError::Negative(trimmed.to_string()));
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidFormat(trimmed.to_string()));
        }
        if whole.len() > MAX_INTEGER_DIGITS {
            return Err(MoneyParseError::TooManyDigits(trimmed.to_string()));
        }

        let dollars: i64 = whole
            .parse()
            .map_err(|_| MoneyParseError::InvalidFormat(trimmed.to_string()))?;

        let cents: i64 = match fraction {
            None => 0,
            Some(f) if f.is_empty() || f.len() > 2 || !f.chars().all(|c| c.is_ascii_digit()) => {
                return Err(MoneyParseError::InvalidFormat(trimmed.to_string()));
            }
            Some(f) if f.len() == 1 => {
                f.parse::<i64>()
                    .map_err(|_| MoneyParseError::InvalidFormat(trimmed.to_string()))?
                    * 10
            }
            Some(f) => f
                .parse()
                .map_err(|_| MoneyParseError::InvalidFormat(trimmed.to_string()))?,
        };

        Ok(Self(dollars * 100 + cents))
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!(
                "-{}{}.{:02}",
                symbol,
                self.dollars().abs(),
                self.cents_part()
            )
        } else {
            format!("{}{}.{:02}", symbol, self.dollars(), self.cents_part())
        }
    }

    /// Plain decimal rendering without a symbol, e.g. "12.50"
    pub fn to_decimal_string(&self) -> String {
        self.format_with_symbol("")
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    Negative(String),
    TooManyDigits(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(
                f,
                "Invalid amount '{}': use numbers with at most 2 decimal places",
                s
            ),
            Self::Negative(s) => write!(f, "Invalid amount '{}': must be at least 0", s),
            Self::TooManyDigits(s) => write!(
                f,
                "Invalid amount '{}': at most {} digits before the decimal point",
                s, MAX_INTEGER_DIGITS
            ),
        }
    }
}

impl std::error::Error for MoneyParseError {}
