//! # fabquote-core: Pure Pricing Types for Fabquote
//!
//! Data model, fixed-point money, error taxonomy and validation rules for
//! manufacturing quotes. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fabquote Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Quote API / job workers (out of tree)              │   │
//! │  │   geometry analysis ──► catalog lookup ──► PricingInput        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    fabquote-pricing                             │   │
//! │  │    PricingEngine ──► ProcessCalculator ──► CostToolkit          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fabquote-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Input    │  │   Money   │  │  Pricing  │  │  config   │  │   │
//! │  │   │  Result   │  │  Percent  │  │  Config   │  │  margin   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Inputs, derived quantities and the pricing result
//! - [`money`] - Decimal `Money` and `Percent`
//! - [`error`] - Domain error types
//! - [`validation`] - Config, margin and cost rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, no hidden state
//! 2. **No I/O**: catalog records and tenant config arrive as values
//! 3. **Decimal Money**: no floating point in any monetary path
//! 4. **Explicit Errors**: fatal conditions are typed errors, the rest are warnings
//!
//! ## Example Usage
//!
//! ```rust
//! use fabquote_core::money::{Money, Percent};
//! use fabquote_core::validation::adjust_discount_for_margin;
//! use rust_decimal_macros::dec;
//!
//! // $130 list price on $100 of cost; a $40 discount would leave 10% margin
//! // only if shrunk to $20.
//! let adjustment = adjust_discount_for_margin(
//!     Money::new(dec!(130)),
//!     Money::new(dec!(100)),
//!     Money::new(dec!(40)),
//!     Percent::new(dec!(10)),
//! );
//! assert_eq!(adjustment.adjusted_discount.amount(), dec!(20));
//! assert!(adjustment.warning.is_some());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ConfigError, CostError, MarginError, PricingError, PricingOutcome};
pub use money::{Money, Percent};
pub use types::*;
pub use validation::ValidatedConfig;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// A required-by date at most this many days away makes the order a rush.
///
/// Dates already in the past count as rush orders too.
pub const RUSH_WINDOW_DAYS: i64 = 3;

/// Lead time quoted for every rush order, regardless of process or quantity.
pub const RUSH_LEAD_DAYS: u32 = 2;
