//! # Money Module
//!
//! Provides the `Money` and `Percent` types used by every cost and price.
//!
//! ## Why Fixed-Point Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In f64:                                                                │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  A quote is a SUM of components that must equal the unit price.         │
//! │  With floats, material + machine + ... + margin - discount drifts.      │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal (96-bit mantissa, 28 digits)                │
//! │    Costs keep sub-cent precision through the pipeline                   │
//! │    Rounding to cents happens only for display                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike whole-cent integers, intermediate costs here are fractions of a
//! cent (a 10 cm³ print consumes $0.31 of filament and $0.0043 of energy),
//! so precision is kept until the caller formats the value.
//!
//! ## Usage
//! ```rust
//! use fabquote_core::money::{Money, Percent};
//! use rust_decimal_macros::dec;
//!
//! let cost = Money::new(dec!(10.00));
//! let margin = Percent::new(dec!(30)).of(cost);
//! assert_eq!((cost + margin).amount(), dec!(13.00));
//! ```

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::CostError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the tenant's currency.
///
/// ## Design Decisions
/// - **Decimal, signed**: intermediate differences (price - cost) may be negative
/// - **Single field tuple struct**: zero-cost wrapper, serialized transparently
/// - **No f64 constructor**: physical quantities go through [`to_decimal`]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from whole cents.
    ///
    /// ```rust
    /// use fabquote_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::from_cents(1099).amount(), dec!(10.99));
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to whole cents using Bankers Rounding (round half to even).
    ///
    /// Only for presentation. Prices keep sub-cent precision so the
    /// breakdown sums exactly to the unit price.
    ///
    /// ```rust
    /// use fabquote_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::new(dec!(2.345)).round_to_cents().amount(), dec!(2.34));
    /// assert_eq!(Money::new(dec!(2.355)).round_to_cents().amount(), dec!(2.36));
    /// ```
    pub fn round_to_cents(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money rounded to cents, e.g. `$12.34`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}${:.2}", sign, rounded.abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Scaling by a physical quantity (hours, kilograms, square metres).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

/// Multiplication by an order quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Percent Type
// =============================================================================

/// A percentage stored as its whole-number value (`30` means 30%).
///
/// Fractional percentages (`12.5`) are exact, unlike basis points which
/// cap precision at 0.01%.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Percent(#[ts(type = "string")] Decimal);

impl Percent {
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Returns the percentage value (`30` for 30%).
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the percentage as a fraction (`0.30` for 30%).
    #[inline]
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Applies this percentage to an amount.
    ///
    /// ```rust
    /// use fabquote_core::money::{Money, Percent};
    /// use rust_decimal_macros::dec;
    ///
    /// let tax = Percent::new(dec!(15)).of(Money::new(dec!(200)));
    /// assert_eq!(tax.amount(), dec!(30));
    /// ```
    #[inline]
    pub fn of(&self, amount: Money) -> Money {
        Money(amount.0 * self.0 / Decimal::ONE_HUNDRED)
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Physical Quantity Conversion
// =============================================================================

/// Converts a physical model output (volume, hours, kWh) into a decimal.
///
/// NaN and infinities cannot be represented as decimals; they surface as a
/// cost component error naming the component that produced them.
pub fn to_decimal(value: f64, component: &str) -> Result<Decimal, CostError> {
    if !value.is_finite() {
        return Err(CostError::NonFinite {
            component: component.to_string(),
        });
    }
    Decimal::from_f64(value).ok_or_else(|| CostError::NonFinite {
        component: component.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
