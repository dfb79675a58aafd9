//! # Validation Module
//!
//! Configuration, margin and cost checks shared by every process calculator.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Construction (once per calculation)                           │
//! │  ├── validate_tenant_config → ValidatedConfig proof                     │
//! │  └── validate_volume_discounts (schedule shape + max discount)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cost components                                               │
//! │  ├── validate_cost_component (each component >= 0)                     │
//! │  └── validate_total_costs (sum > 0)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Final price                                                   │
//! │  ├── adjust_discount_for_margin (shrinks, warns)                        │
//! │  └── validate_final_margin (fails below cost / 10%, warns below floor)  │
//! │                                                                         │
//! │  Fatal conditions are errors. Everything else is a warning string.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fabquote_core::money::{Money, Percent};
//! use fabquote_core::validation::calculate_minimum_price;
//! use rust_decimal_macros::dec;
//!
//! let min = calculate_minimum_price(Money::new(dec!(100)), Percent::new(dec!(30)));
//! assert_eq!(min.amount(), dec!(130));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::error::{ConfigError, CostError, MarginError, PricingError};
use crate::money::{Money, Percent};
use crate::types::{TenantPricingConfig, VolumeDiscount};

/// No quote may ever carry less profit than this, discounts included.
pub const ABSOLUTE_MINIMUM_MARGIN_PERCENT: Decimal = dec!(10);

/// Effective margins below this produce a low-margin warning.
pub const WARNING_MARGIN_PERCENT: Decimal = dec!(20);

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Two-decimal rendering used in warning and error text.
fn fixed2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

// =============================================================================
// Config Validator
// =============================================================================

/// Validates a tenant pricing configuration.
///
/// ## Rules
/// - Margin floor must be strictly positive
/// - Overhead, energy tariff, labor rate, rush upcharge, minimum charge and
///   both CO2e factors must be >= 0
/// - Volume discounts must pass [`validate_volume_discounts`]
///
/// ## Example
/// ```rust
/// use fabquote_core::validation::validate_tenant_config;
/// # use fabquote_core::money::{Money, Percent};
/// # use fabquote_core::types::TenantPricingConfig;
/// # use rust_decimal_macros::dec;
/// let mut config = TenantPricingConfig {
///     margin_floor_percent: Percent::new(dec!(30)),
///     overhead_percent: Percent::new(dec!(15)),
///     energy_tariff_per_kwh: Money::new(dec!(0.12)),
///     labor_rate_per_hour: Money::new(dec!(25)),
///     rush_upcharge_percent: Percent::new(dec!(25)),
///     volume_discounts: vec![],
///     grid_co2e_factor: dec!(0.4),
///     logistics_co2e_factor: dec!(0.0001),
///     minimum_charge: Money::zero(),
/// };
/// assert!(validate_tenant_config(&config).is_ok());
///
/// config.margin_floor_percent = Percent::zero();
/// assert!(validate_tenant_config(&config).is_err());
/// ```
pub fn validate_tenant_config(config: &TenantPricingConfig) -> ConfigResult<()> {
    let floor = config.margin_floor_percent;
    if floor.is_negative() {
        return Err(ConfigError::MarginFloorNotPositive { value: floor.value() });
    }
    if floor.is_zero() {
        return Err(ConfigError::MarginFloorZero);
    }

    non_negative("Overhead percentage", config.overhead_percent.value())?;
    non_negative("Energy tariff", config.energy_tariff_per_kwh.amount())?;
    non_negative("Labor rate", config.labor_rate_per_hour.amount())?;
    non_negative("Rush upcharge percentage", config.rush_upcharge_percent.value())?;
    non_negative("Minimum charge", config.minimum_charge.amount())?;

    if !config.volume_discounts.is_empty() {
        validate_volume_discounts(&config.volume_discounts, floor)?;
    }

    non_negative("Grid CO2e factor", config.grid_co2e_factor)?;
    non_negative("Logistics CO2e factor", config.logistics_co2e_factor)?;

    Ok(())
}

fn non_negative(field: &'static str, value: Decimal) -> ConfigResult<()> {
    if value < Decimal::ZERO {
        return Err(ConfigError::MustBeNonNegative { field, value });
    }
    Ok(())
}

/// Proof that a tenant configuration passed [`validate_tenant_config`].
///
/// Calculators can only be built from one of these, so no cost is ever
/// computed against an invalid configuration.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedConfig<'a>(&'a TenantPricingConfig);

impl<'a> ValidatedConfig<'a> {
    pub fn new(config: &'a TenantPricingConfig) -> ConfigResult<Self> {
        validate_tenant_config(config)?;
        Ok(ValidatedConfig(config))
    }

    pub fn get(&self) -> &'a TenantPricingConfig {
        self.0
    }
}

impl std::ops::Deref for ValidatedConfig<'_> {
    type Target = TenantPricingConfig;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

// =============================================================================
// Margin Validator
// =============================================================================

/// Outcome of [`validate_final_margin`] when the price is sellable.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginCheck {
    /// Effective margin meets the tenant's configured floor.
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub effective_margin_percent: Decimal,
}

/// Outcome of [`adjust_discount_for_margin`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountAdjustment {
    pub adjusted_discount: Money,
    /// Present only when the requested discount was shrunk.
    pub warning: Option<String>,
}

/// Rejects negative margin percentages.
pub fn validate_margin_percent(margin: Percent) -> Result<(), MarginError> {
    if margin.is_negative() {
        return Err(MarginError::NegativePercent {
            value: fixed2(margin.value()),
        });
    }
    Ok(())
}

/// Checks the final price against cost and margin floors.
///
/// ## Rules
/// ```text
/// total_cost == 0                      → Err(Total cost cannot be zero)
/// final_price < total_cost             → Err(below cost)
/// effective margin < 10%               → Err(below absolute minimum)
/// effective margin < min_margin        → warning, is_valid = false
/// effective margin < 20%               → warning (low margin)
/// ```
pub fn validate_final_margin(
    total_cost: Money,
    final_price: Money,
    min_margin: Percent,
) -> Result<MarginCheck, PricingError> {
    if total_cost.is_zero() {
        return Err(CostError::ZeroTotal.into());
    }

    let effective_margin_percent =
        (final_price - total_cost).amount() / total_cost.amount() * Decimal::ONE_HUNDRED;

    if final_price < total_cost {
        return Err(MarginError::BelowCost {
            final_price: fixed2(final_price.amount()),
            total_cost: fixed2(total_cost.amount()),
        }
        .into());
    }

    if effective_margin_percent < ABSOLUTE_MINIMUM_MARGIN_PERCENT {
        return Err(MarginError::BelowAbsoluteMinimum {
            effective: fixed2(effective_margin_percent),
            minimum: ABSOLUTE_MINIMUM_MARGIN_PERCENT,
        }
        .into());
    }

    let mut warnings = Vec::new();
    if effective_margin_percent < min_margin.value() {
        warnings.push(format!(
            "Effective margin ({:.2}%) is below configured minimum ({:.2}%)",
            fixed2(effective_margin_percent),
            fixed2(min_margin.value())
        ));
    }
    if effective_margin_percent < WARNING_MARGIN_PERCENT {
        warnings.push(format!(
            "Low margin warning: {:.2}% is below recommended {}%",
            fixed2(effective_margin_percent),
            WARNING_MARGIN_PERCENT
        ));
    }

    Ok(MarginCheck {
        is_valid: effective_margin_percent >= min_margin.value(),
        warnings,
        effective_margin_percent,
    })
}

/// Validates a volume discount schedule against a margin floor.
///
/// ## Rules
/// - No tier may be negative
/// - No tier may exceed `100 - margin_floor - 10`
/// - Sorted by quantity, discount percentages never go down
pub fn validate_volume_discounts(
    tiers: &[VolumeDiscount],
    margin_floor: Percent,
) -> ConfigResult<()> {
    let max_allowed =
        Decimal::ONE_HUNDRED - margin_floor.value() - ABSOLUTE_MINIMUM_MARGIN_PERCENT;

    for tier in tiers {
        let discount = tier.discount_percent.value();
        if tier.discount_percent.is_negative() {
            return Err(ConfigError::NegativeDiscount {
                min_quantity: tier.min_quantity,
            });
        }
        if discount > max_allowed {
            return Err(ConfigError::DiscountExceedsMargin {
                min_quantity: tier.min_quantity,
                discount: fixed2(discount),
                max_allowed: fixed2(max_allowed),
            });
        }
    }

    let mut sorted: Vec<&VolumeDiscount> = tiers.iter().collect();
    sorted.sort_by_key(|tier| tier.min_quantity);
    if sorted
        .windows(2)
        .any(|pair| pair[1].discount_percent < pair[0].discount_percent)
    {
        return Err(ConfigError::DiscountsNotMonotonic);
    }

    Ok(())
}

/// Lowest price that still carries `margin_floor` over `total_cost`.
pub fn calculate_minimum_price(total_cost: Money, margin_floor: Percent) -> Money {
    total_cost * (Decimal::ONE + margin_floor.as_fraction())
}

/// Shrinks a discount so the discounted price stays at or above the
/// minimum price for `margin_floor`.
///
/// The adjusted discount is clamped at zero. A warning describes the change
/// whenever the requested discount was reduced.
pub fn adjust_discount_for_margin(
    base_price: Money,
    total_cost: Money,
    requested_discount: Money,
    margin_floor: Percent,
) -> DiscountAdjustment {
    let minimum_price = calculate_minimum_price(total_cost, margin_floor);

    if base_price - requested_discount >= minimum_price {
        return DiscountAdjustment {
            adjusted_discount: requested_discount,
            warning: None,
        };
    }

    let adjusted = (base_price - minimum_price).non_negative();
    debug!(
        requested = %requested_discount.amount(),
        adjusted = %adjusted.amount(),
        "Discount attenuated to preserve margin"
    );

    DiscountAdjustment {
        adjusted_discount: adjusted,
        warning: Some(format!(
            "Discount reduced from {:.2} to {:.2} to maintain minimum margin",
            fixed2(requested_discount.amount()),
            fixed2(adjusted.amount())
        )),
    }
}

// =============================================================================
// Cost Validator
// =============================================================================

/// A single cost component must not be negative.
///
/// Decimals are always finite; non-finite physical quantities are rejected
/// earlier by [`crate::money::to_decimal`].
pub fn validate_cost_component(value: Money, component: &str) -> Result<(), CostError> {
    if value.is_negative() {
        return Err(CostError::Negative {
            component: component.to_string(),
        });
    }
    Ok(())
}

/// Validates the five cost components and returns their sum.
pub fn validate_total_costs(
    material: Money,
    machine: Money,
    energy: Money,
    labor: Money,
    overhead: Money,
) -> Result<Money, CostError> {
    let components = [
        ("Material", material),
        ("Machine", machine),
        ("Energy", energy),
        ("Labor", labor),
        ("Overhead", overhead),
    ];

    for (name, value) in components {
        validate_cost_component(value, name)?;
    }

    let total: Money = components.iter().map(|(_, value)| *value).sum();
    if total.is_zero() {
        return Err(CostError::ZeroTotal);
    }
    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(d: Decimal) -> Money {
        Money::new(d)
    }

    fn pct(d: Decimal) -> Percent {
        Percent::new(d)
    }

    fn config() -> TenantPricingConfig {
        TenantPricingConfig {
            margin_floor_percent: pct(dec!(30)),
            overhead_percent: pct(dec!(15)),
            energy_tariff_per_kwh: money(dec!(0.12)),
            labor_rate_per_hour: money(dec!(25)),
            rush_upcharge_percent: pct(dec!(25)),
            volume_discounts: vec![
                VolumeDiscount::new(50, pct(dec!(10))),
                VolumeDiscount::new(100, pct(dec!(15))),
            ],
            grid_co2e_factor: dec!(0.4),
            logistics_co2e_factor: dec!(0.0001),
            minimum_charge: Money::zero(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_tenant_config(&config()).is_ok());
        assert!(ValidatedConfig::new(&config()).is_ok());
    }

    #[test]
    fn test_negative_margin_floor() {
        let mut c = config();
        c.margin_floor_percent = pct(dec!(-10));
        let err = validate_tenant_config(&c).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_zero_margin_floor() {
        let mut c = config();
        c.margin_floor_percent = Percent::zero();
        let err = ValidatedConfig::new(&c).unwrap_err();
        assert!(err.to_string().contains("cannot be zero"));
    }

    #[test]
    fn test_negative_rates_rejected() {
        let mut c = config();
        c.labor_rate_per_hour = money(dec!(-1));
        let err = validate_tenant_config(&c).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MustBeNonNegative {
                field: "Labor rate",
                value: dec!(-1)
            }
        );

        let mut c = config();
        c.logistics_co2e_factor = dec!(-0.1);
        assert!(validate_tenant_config(&c).is_err());

        let mut c = config();
        c.minimum_charge = money(dec!(-5));
        assert!(validate_tenant_config(&c).is_err());
    }

    #[test]
    fn test_decreasing_discounts_rejected() {
        let mut c = config();
        c.volume_discounts = vec![
            VolumeDiscount::new(100, pct(dec!(5))),
            VolumeDiscount::new(50, pct(dec!(10))),
        ];
        let err = validate_tenant_config(&c).unwrap_err();
        assert!(err.to_string().contains("must increase with quantity"));
    }

    #[test]
    fn test_equal_discounts_allowed() {
        let tiers = [
            VolumeDiscount::new(10, pct(dec!(5))),
            VolumeDiscount::new(20, pct(dec!(5))),
        ];
        assert!(validate_volume_discounts(&tiers, pct(dec!(30))).is_ok());
    }

    #[test]
    fn test_discount_limits() {
        let negative = [VolumeDiscount::new(10, pct(dec!(-1)))];
        let err = validate_volume_discounts(&negative, pct(dec!(30))).unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));

        // 100 - 30 - 10 = 60
        let too_big = [VolumeDiscount::new(10, pct(dec!(61)))];
        let err = validate_volume_discounts(&too_big, pct(dec!(30))).unwrap_err();
        assert!(err
            .to_string()
            .contains("would violate minimum margin requirements"));
        assert!(err.to_string().contains("61.00%"));
        assert!(err.to_string().contains("(max allowed: 60.00%)"));

        let at_limit = [VolumeDiscount::new(10, pct(dec!(60)))];
        assert!(validate_volume_discounts(&at_limit, pct(dec!(30))).is_ok());
    }

    #[test]
    fn test_minimum_price_matches_additive_margin() {
        let costs = [dec!(0.01), dec!(0.3333), dec!(1), dec!(17.89), dec!(12345.6789)];
        let floors = [dec!(0.5), dec!(10), dec!(12.5), dec!(30), dec!(99.99)];
        for cost in costs {
            for floor in floors {
                let total = money(cost);
                let additive = total + pct(floor).of(total);
                let minimum = calculate_minimum_price(total, pct(floor));
                assert_eq!(additive, minimum, "cost {cost}, floor {floor}");
            }
        }
    }

    #[test]
    fn test_final_margin_rules() {
        let cost = money(dec!(100));

        let check = validate_final_margin(cost, money(dec!(130)), pct(dec!(30))).unwrap();
        assert!(check.is_valid);
        assert!(check.warnings.is_empty());
        assert_eq!(check.effective_margin_percent, dec!(30));

        let check = validate_final_margin(cost, money(dec!(115)), pct(dec!(30))).unwrap();
        assert!(!check.is_valid);
        assert_eq!(check.warnings.len(), 2);
        assert!(check.warnings[0].starts_with("Effective margin (15.00%)"));
        assert!(check.warnings[1].starts_with("Low margin warning"));

        let err = validate_final_margin(cost, money(dec!(105)), pct(dec!(30))).unwrap_err();
        assert!(matches!(
            err,
            PricingError::MarginViolation(MarginError::BelowAbsoluteMinimum { .. })
        ));
        assert!(err.to_string().contains("Margin (5.00%)"));

        let err = validate_final_margin(cost, money(dec!(90)), pct(dec!(30))).unwrap_err();
        assert!(matches!(
            err,
            PricingError::MarginViolation(MarginError::BelowCost { .. })
        ));
        assert!(err
            .to_string()
            .contains("Final price (90.00) cannot be below total cost (100.00)"));

        let err = validate_final_margin(Money::zero(), money(dec!(1)), pct(dec!(30))).unwrap_err();
        assert!(err.to_string().contains("Total cost cannot be zero"));
    }

    #[test]
    fn test_validate_margin_percent() {
        assert!(validate_margin_percent(pct(dec!(0))).is_ok());
        let err = validate_margin_percent(pct(dec!(-0.5))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Margin percentage cannot be negative (-0.50%)"
        );
    }

    #[test]
    fn test_discount_untouched_when_margin_holds() {
        let adj = adjust_discount_for_margin(
            money(dec!(130)),
            money(dec!(100)),
            money(dec!(13)),
            pct(ABSOLUTE_MINIMUM_MARGIN_PERCENT),
        );
        assert_eq!(adj.adjusted_discount.amount(), dec!(13));
        assert!(adj.warning.is_none());
    }

    #[test]
    fn test_discount_attenuated_and_clamped() {
        let adj = adjust_discount_for_margin(
            money(dec!(130)),
            money(dec!(100)),
            money(dec!(40)),
            pct(dec!(10)),
        );
        assert_eq!(adj.adjusted_discount.amount(), dec!(20));
        let warning = adj.warning.unwrap();
        assert!(warning.starts_with("Discount reduced from 40.00 to 20.00"));

        let adj = adjust_discount_for_margin(
            money(dec!(105)),
            money(dec!(100)),
            money(dec!(10)),
            pct(dec!(10)),
        );
        assert_eq!(adj.adjusted_discount, Money::zero());
        assert!(adj.warning.is_some());
    }

    #[test]
    fn test_total_costs() {
        let total = validate_total_costs(
            money(dec!(1)),
            money(dec!(2)),
            money(dec!(0.5)),
            Money::zero(),
            money(dec!(0.5)),
        )
        .unwrap();
        assert_eq!(total.amount(), dec!(4));

        let err = validate_total_costs(
            Money::zero(),
            Money::zero(),
            Money::zero(),
            Money::zero(),
            Money::zero(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Total cost cannot be zero");

        let err = validate_total_costs(
            money(dec!(1)),
            money(dec!(-2)),
            Money::zero(),
            Money::zero(),
            Money::zero(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Machine cost cannot be negative");
    }
}
