//! # Error Types
//!
//! Domain error taxonomy for the pricing core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  PricingError                                                          │
//! │  ├── Configuration(ConfigError)   - tenant config broke an invariant   │
//! │  ├── CostComponent(CostError)     - negative / non-finite / zero cost  │
//! │  ├── MarginViolation(MarginError) - price below cost or absolute floor │
//! │  ├── UnsupportedProcess           - no calculator for the process      │
//! │  └── InvalidInput                 - structural checks failed           │
//! │                                                                         │
//! │  Warnings are NOT errors: they travel in PricingResult::warnings       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending values in the message
//! 3. Every fatal condition is an enum variant, never a bare String

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::ProcessType;

// =============================================================================
// Pricing Error
// =============================================================================

/// Top-level error returned by every fallible pricing operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Tenant configuration violates an invariant.
    ///
    /// Raised when a calculator is constructed. Fatal: the caller must fix
    /// the configuration before retrying.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A cost component is negative, non-finite, or every component is zero.
    ///
    /// Indicates bad input data or a modeling bug.
    #[error("Cost component error: {0}")]
    CostComponent(#[from] CostError),

    /// The final price would sell below cost or below the absolute margin floor.
    #[error("Margin violation: {0}")]
    MarginViolation(#[from] MarginError),

    /// No calculator is registered for the requested process.
    #[error("No calculator found for process: {0}")]
    UnsupportedProcess(ProcessType),

    /// Structural input checks failed.
    #[error("Invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),
}

// =============================================================================
// Configuration Error
// =============================================================================

/// Tenant pricing configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Margin floor is negative.
    #[error("Margin floor percentage must be positive (got {value}%)")]
    MarginFloorNotPositive { value: Decimal },

    /// Margin floor is exactly zero.
    #[error("Margin floor percentage cannot be zero")]
    MarginFloorZero,

    /// A rate, percentage or factor that must be >= 0 is negative.
    #[error("{field} must be non-negative (got {value})")]
    MustBeNonNegative { field: &'static str, value: Decimal },

    /// A volume discount tier has a negative percentage.
    #[error("Volume discount cannot be negative for quantity {min_quantity}")]
    NegativeDiscount { min_quantity: u32 },

    /// A tier discount leaves less than the absolute minimum margin.
    #[error(
        "Volume discount {discount}% for quantity {min_quantity} would violate minimum margin requirements (max allowed: {max_allowed}%)"
    )]
    DiscountExceedsMargin {
        min_quantity: u32,
        discount: Decimal,
        max_allowed: Decimal,
    },

    /// Discount percentages go down as quantity goes up.
    #[error("Volume discounts must increase with quantity")]
    DiscountsNotMonotonic,
}

// =============================================================================
// Cost Error
// =============================================================================

/// Cost component sanity errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("{component} cost cannot be negative")]
    Negative { component: String },

    #[error("{component} cost must be finite")]
    NonFinite { component: String },

    /// Every component summed to zero. A free quote is a config/input error.
    #[error("Total cost cannot be zero")]
    ZeroTotal,
}

// =============================================================================
// Margin Error
// =============================================================================

/// Margin enforcement errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarginError {
    #[error("Margin percentage cannot be negative ({value}%)")]
    NegativePercent { value: Decimal },

    #[error("Final price ({final_price}) cannot be below total cost ({total_cost})")]
    BelowCost {
        final_price: Decimal,
        total_cost: Decimal,
    },

    #[error("Margin ({effective}%) is below absolute minimum ({minimum}%)")]
    BelowAbsoluteMinimum { effective: Decimal, minimum: Decimal },

    #[error("Discount ({discount}) exceeds margin ({margin}): quote would sell at a loss")]
    LossAfterDiscount { margin: Decimal, discount: Decimal },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience alias for results carrying [`PricingError`].
///
/// Named `PricingOutcome` so it does not collide with the
/// [`PricingResult`](crate::types::PricingResult) struct.
pub type PricingOutcome<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
