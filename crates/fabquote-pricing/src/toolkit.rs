//! # Cost Toolkit
//!
//! Shared cost math used by every process calculator.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Unit Price Assembly                            │
//! │                                                                         │
//! │  ProcessingTime ──┬──► machine  = total h × hourly rate                 │
//! │                   ├──► energy   = processing h × kW × tariff            │
//! │                   └──► labor    = (setup + post) h × labor rate         │
//! │  MaterialUsage ─────► material = gross cm³ × g/cm³ / 1000 × price/kg    │
//! │                                                                         │
//! │  subtotal  = material + machine + energy + labor                        │
//! │  overhead  = subtotal × overhead%                                       │
//! │  cost      = subtotal + overhead                                        │
//! │  margin    = cost × margin floor%                                       │
//! │  base      = cost + margin                                              │
//! │  discount  = tier% × base, attenuated to keep >= 10% over cost          │
//! │  unit      = cost + margin - discount                                   │
//! │                                                                         │
//! │  Processing time is unattended machine time: it is never labor.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every primitive checks its result is a non-negative, finite amount and
//! carries it at [`COST_SCALE`] decimal places.

use chrono::{DateTime, Utc};
use fabquote_core::money::to_decimal;
use fabquote_core::validation::{
    adjust_discount_for_margin, validate_cost_component, validate_final_margin,
    validate_total_costs, ValidatedConfig, ABSOLUTE_MINIMUM_MARGIN_PERCENT,
};
use fabquote_core::{
    Co2eBreakdown, ConfigError, CostBreakdown, CostError, MarginError, MaterialUsage, Money,
    Percent, PricingInput, PricingOutcome, ProcessingTime, SustainabilityResult, VolumeDiscount,
    RUSH_LEAD_DAYS, RUSH_WINDOW_DAYS,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SECONDS_PER_DAY: i64 = 86_400;

/// Decimal places kept on each cost component.
///
/// Fixing the scale keeps margin, discount and upcharge arithmetic exact, so
/// the breakdown sums to the unit price without rounding residue.
pub const COST_SCALE: u32 = 10;

/// Freight distance assumed for logistics emissions, in units of 100 km.
const LOGISTICS_DISTANCE_FACTOR: Decimal = dec!(100);

// =============================================================================
// Supporting Types
// =============================================================================

/// The five cost components of one part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostComponents {
    pub material: Money,
    pub machine: Money,
    pub energy: Money,
    pub labor: Money,
    pub overhead: Money,
}

impl CostComponents {
    /// Sum in breakdown order, so it equals [`CostBreakdown::total_cost`].
    pub fn total(&self) -> Money {
        self.material + self.machine + self.energy + self.labor + self.overhead
    }
}

/// Discount chosen for the order quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    /// Tier that matched, if any.
    pub tier: Option<VolumeDiscount>,
    /// Discount after margin attenuation.
    pub amount: Money,
    pub warnings: Vec<String>,
}

// =============================================================================
// Cost Toolkit
// =============================================================================

/// Cost primitives bound to one input and its validated tenant config.
#[derive(Debug, Clone, Copy)]
pub struct CostToolkit<'a> {
    input: &'a PricingInput,
    config: ValidatedConfig<'a>,
}

impl<'a> CostToolkit<'a> {
    /// Validates the input's tenant config and binds the toolkit to it.
    pub fn new(input: &'a PricingInput) -> Result<Self, ConfigError> {
        let config = ValidatedConfig::new(&input.tenant_config)?;
        Ok(CostToolkit { input, config })
    }

    pub fn input(&self) -> &'a PricingInput {
        self.input
    }

    pub fn config(&self) -> ValidatedConfig<'a> {
        self.config
    }

    // =========================================================================
    // Cost Primitives
    // =========================================================================

    /// Mass of the gross material in kg.
    pub fn material_mass_kg(&self, usage: &MaterialUsage) -> Result<Decimal, CostError> {
        let gross = to_decimal(usage.gross_volume_cm3, "Material")?;
        let density = to_decimal(self.input.material.density_g_cm3, "Material")?;
        Ok(gross * density / dec!(1000))
    }

    pub fn material_cost(&self, usage: &MaterialUsage) -> Result<Money, CostError> {
        let cost = self.input.material.price_per_uom * self.material_mass_kg(usage)?;
        checked(cost, "Material")
    }

    /// Machine time is billed for the whole job, setup included.
    pub fn machine_cost(&self, time: &ProcessingTime) -> Result<Money, CostError> {
        let cost = per_hour(self.input.machine.hourly_rate, time.total_minutes);
        checked(cost, "Machine")
    }

    /// Energy drawn while processing.
    pub fn energy_kwh(&self, time: &ProcessingTime) -> Result<Decimal, CostError> {
        let power_w = to_decimal(self.input.machine.power_w, "Energy")?;
        Ok(power_w * Decimal::from(time.processing_minutes) / dec!(60_000))
    }

    pub fn energy_cost(&self, time: &ProcessingTime) -> Result<Money, CostError> {
        let cost = self.config.energy_tariff_per_kwh * self.energy_kwh(time)?;
        checked(cost, "Energy")
    }

    pub fn labor_cost(&self, time: &ProcessingTime) -> Result<Money, CostError> {
        let cost = per_hour(self.config.labor_rate_per_hour, time.labor_minutes());
        checked(cost, "Labor")
    }

    pub fn overhead_cost(&self, subtotal: Money) -> Result<Money, CostError> {
        checked(self.config.overhead_percent.of(subtotal), "Overhead")
    }

    /// Margin at the tenant floor over the cost total.
    ///
    /// `cost + margin(cost)` is exactly the tenant's minimum price.
    pub fn margin(&self, cost_total: Money) -> Money {
        self.config.margin_floor_percent.of(cost_total)
    }

    /// Discount of the highest tier met by the order quantity.
    ///
    /// The requested discount is shrunk so the discounted price never falls
    /// below the absolute minimum margin. Falling below the tenant floor is
    /// reported later by [`CostToolkit::validate_final_pricing`].
    pub fn volume_discount(&self, base_price: Money, total_cost: Money) -> AppliedDiscount {
        let quantity = self.input.quantity;
        let tier = self
            .config
            .volume_discounts
            .iter()
            .filter(|tier| quantity >= tier.min_quantity)
            .max_by_key(|tier| tier.min_quantity)
            .copied();

        let Some(tier) = tier else {
            return AppliedDiscount {
                tier: None,
                amount: Money::zero(),
                warnings: Vec::new(),
            };
        };

        let requested = tier.discount_percent.of(base_price);
        let adjustment = adjust_discount_for_margin(
            base_price,
            total_cost,
            requested,
            Percent::new(ABSOLUTE_MINIMUM_MARGIN_PERCENT),
        );

        if adjustment.warning.is_some() {
            tracing::warn!(
                quantity,
                tier_min_quantity = tier.min_quantity,
                requested = %requested,
                adjusted = %adjustment.adjusted_discount,
                "Volume discount attenuated"
            );
        }

        AppliedDiscount {
            tier: Some(tier),
            amount: adjustment.adjusted_discount,
            warnings: adjustment.warning.into_iter().collect(),
        }
    }

    // =========================================================================
    // Sustainability
    // =========================================================================

    /// Emissions and the composite 0-100 sustainability score.
    ///
    /// ```text
    /// score = round(0.5 × max(0, 100 - 10 × kgCO2e)
    ///             + 0.3 × max(0, 100 - 2 × waste%)
    ///             + 0.2 × recycled%)
    /// ```
    pub fn sustainability(
        &self,
        energy_kwh: Decimal,
        usage: &MaterialUsage,
    ) -> Result<SustainabilityResult, CostError> {
        let mass_kg = self.material_mass_kg(usage)?;
        let energy = energy_kwh * self.config.grid_co2e_factor;
        let material = mass_kg * self.input.material.co2e_factor;
        let logistics = mass_kg * LOGISTICS_DISTANCE_FACTOR * self.config.logistics_co2e_factor;
        let total = energy + material + logistics;

        let waste_percent = usage.waste_percent();
        let waste = to_decimal(waste_percent, "Material")?;
        let recycled_percent = self.input.material.recycled_percent;
        let recycled = to_decimal(recycled_percent, "Material")?;

        let co2e_score = (Decimal::ONE_HUNDRED - dec!(10) * total).max(Decimal::ZERO);
        let waste_score = (Decimal::ONE_HUNDRED - dec!(2) * waste).max(Decimal::ZERO);
        let raw = dec!(0.5) * co2e_score + dec!(0.3) * waste_score + dec!(0.2) * recycled;
        let score = raw
            .round()
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .to_u8()
            .unwrap_or(0);

        Ok(SustainabilityResult {
            score,
            co2e: Co2eBreakdown {
                material,
                energy,
                logistics,
                total,
            },
            energy_kwh,
            recycled_percent,
            waste_percent: waste_percent.round(),
        })
    }

    // =========================================================================
    // Lead Time
    // =========================================================================

    /// True when the required-by date is within the rush window of `now`.
    ///
    /// Days are counted rounding up, so anything due within 3 × 24 hours
    /// (or already overdue) is a rush.
    pub fn is_rush(&self, now: DateTime<Utc>) -> bool {
        self.input.required_by.is_some_and(|required_by| {
            let seconds = (required_by - now).num_seconds();
            let days = (seconds + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY);
            days <= RUSH_WINDOW_DAYS
        })
    }

    /// Lead time in days for a process with the given base lead.
    ///
    /// ```text
    /// rush order            → 2
    /// quantity <= 10        → base
    /// quantity <= 50        → base + 2
    /// quantity <= 100       → base + 4
    /// otherwise             → base + 7
    /// ```
    pub fn lead_time(&self, base_lead_days: u32, now: DateTime<Utc>) -> u32 {
        if self.is_rush(now) {
            return RUSH_LEAD_DAYS;
        }
        let offset = match self.input.quantity {
            0..=10 => 0,
            11..=50 => 2,
            51..=100 => 4,
            _ => 7,
        };
        base_lead_days + offset
    }

    // =========================================================================
    // Breakdown & Final Validation
    // =========================================================================

    /// Assembles the itemized breakdown after validating every component.
    pub fn build_cost_breakdown(
        &self,
        components: &CostComponents,
        margin: Money,
        discount: Option<Money>,
        tooling: Option<Money>,
    ) -> Result<CostBreakdown, CostError> {
        validate_total_costs(
            components.material,
            components.machine,
            components.energy,
            components.labor,
            components.overhead,
        )?;
        validate_cost_component(margin, "Margin")?;
        if let Some(discount) = discount {
            validate_cost_component(discount, "Discount")?;
        }

        Ok(CostBreakdown {
            material: components.material,
            machine: components.machine,
            energy: components.energy,
            labor: components.labor,
            overhead: components.overhead,
            margin,
            tooling,
            discount,
        })
    }

    /// Final margin check on the price about to be quoted.
    ///
    /// Fails when the discount eats the whole margin, below cost, or below
    /// the absolute minimum margin. Returns the margin warnings otherwise.
    pub fn validate_final_pricing(
        &self,
        total_cost: Money,
        final_price: Money,
        margin: Money,
        discount: Money,
    ) -> PricingOutcome<Vec<String>> {
        if (margin - discount).is_negative() {
            return Err(MarginError::LossAfterDiscount {
                margin: margin.round_to_cents().amount(),
                discount: discount.round_to_cents().amount(),
            }
            .into());
        }

        let check =
            validate_final_margin(total_cost, final_price, self.config.margin_floor_percent)?;
        Ok(check.warnings)
    }
}

/// `rate × minutes / 60`, multiplying first to keep precision.
fn per_hour(rate: Money, minutes: u32) -> Money {
    Money::new(rate.amount() * Decimal::from(minutes) / dec!(60))
}

/// Validates a component and fixes it at [`COST_SCALE`] decimal places.
pub(crate) fn checked(cost: Money, component: &str) -> Result<Money, CostError> {
    validate_cost_component(cost, component)?;
    Ok(Money::new(cost.amount().round_dp(COST_SCALE)))
}

// =============================================================================
// Unit Tests
// =============================================================================
