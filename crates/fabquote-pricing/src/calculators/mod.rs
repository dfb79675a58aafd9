//! # Process Calculators
//!
//! One physical model per manufacturing process, all priced through the same
//! pipeline.
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ProcessCalculator (closed set)                     │
//! │                                                                         │
//! │   FFF ────────► Filament   deposition rate, infill, supports            │
//! │   SLA ────────► Resin      layers × (exposure + peel), raft, packing    │
//! │   CNC_3AXIS ──► Cnc        stock removal ÷ MRR × complexity, tooling    │
//! │   LASER_2D ───► Laser      cut length ÷ speed + pierces, sheet area     │
//! │   other ──────► None       (UnsupportedProcess)                         │
//! │                                                                         │
//! │  Every variant implements ProcessModel; the provided calculate_at()    │
//! │  runs the shared pipeline:                                             │
//! │                                                                         │
//! │   costs → subtotal → overhead → margin → discount → unit price         │
//! │         → rush upcharge → minimum charge → final validation            │
//! │         → total → sustainability → lead time → warnings                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cnc;
pub mod filament;
pub mod laser;
pub mod resin;

use chrono::{DateTime, Utc};
use fabquote_core::{
    CostError, MaterialUsage, Money, PricingInput, PricingOutcome, PricingResult, ProcessType,
    ProcessingTime,
};
use tracing::debug;

use crate::toolkit::{CostComponents, CostToolkit};

pub use cnc::CncCalculator;
pub use filament::FilamentCalculator;
pub use laser::LaserCalculator;
pub use resin::ResinCalculator;

// =============================================================================
// Process Model Trait
// =============================================================================

/// Process-specific physics plugged into the shared pricing pipeline.
pub trait ProcessModel {
    /// Setup, processing and post-processing minutes for one part.
    fn compute_time(&self, input: &PricingInput) -> Result<ProcessingTime, CostError>;

    /// Material consumed by one part.
    fn compute_material_usage(&self, input: &PricingInput) -> MaterialUsage;

    /// Model certainty reported with every result.
    fn confidence(&self) -> f64;

    /// Lead time before quantity and rush adjustments.
    fn base_lead_days(&self) -> u32;

    /// Extra tooling cost, billed as labor.
    fn tooling_cost(
        &self,
        _input: &PricingInput,
        _time: &ProcessingTime,
    ) -> Result<Option<Money>, CostError> {
        Ok(None)
    }

    /// Material cost; mass-based unless the process sells by area.
    fn material_cost(
        &self,
        toolkit: &CostToolkit<'_>,
        usage: &MaterialUsage,
    ) -> Result<Money, CostError> {
        toolkit.material_cost(usage)
    }

    /// Process-specific warnings about the part.
    fn warnings(
        &self,
        input: &PricingInput,
        time: &ProcessingTime,
        usage: &MaterialUsage,
    ) -> Vec<String>;

    /// Prices one line item with the clock fixed at `now`.
    fn calculate_at(
        &self,
        input: &PricingInput,
        now: DateTime<Utc>,
    ) -> PricingOutcome<PricingResult> {
        let toolkit = CostToolkit::new(input)?;
        let config = toolkit.config();

        let time = self.compute_time(input)?;
        let usage = self.compute_material_usage(input);

        // Cost components
        let material = self.material_cost(&toolkit, &usage)?;
        let machine = toolkit.machine_cost(&time)?;
        let energy_kwh = toolkit.energy_kwh(&time)?;
        let energy = toolkit.energy_cost(&time)?;
        let tooling = self.tooling_cost(input, &time)?;
        let labor = toolkit.labor_cost(&time)? + tooling.unwrap_or_default();

        let subtotal = material + machine + energy + labor;
        let overhead = toolkit.overhead_cost(subtotal)?;
        let components = CostComponents {
            material,
            machine,
            energy,
            labor,
            overhead,
        };
        let cost_total = components.total();

        // Margin and discount
        let mut margin = toolkit.margin(cost_total);
        let base_price = cost_total + margin;
        let applied = toolkit.volume_discount(base_price, cost_total);
        let discount = applied.amount;
        let mut warnings = applied.warnings;

        if toolkit.is_rush(now) && !config.rush_upcharge_percent.is_zero() {
            margin += config
                .rush_upcharge_percent
                .of(cost_total + margin - discount);
            warnings.push("Rush order upcharge applied".to_string());
        }

        let priced = cost_total + margin - discount;
        if priced < config.minimum_charge {
            margin += config.minimum_charge - priced;
            warnings.push("Minimum charge applied".to_string());
        }

        let unit_price = cost_total + margin - discount;
        warnings.extend(toolkit.validate_final_pricing(cost_total, unit_price, margin, discount)?);

        let breakdown = toolkit.build_cost_breakdown(
            &components,
            margin,
            applied.tier.map(|_| discount),
            tooling,
        )?;
        let total_price = unit_price * input.quantity;
        let sustainability = toolkit.sustainability(energy_kwh, &usage)?;
        let lead_days = toolkit.lead_time(self.base_lead_days(), now);
        warnings.extend(self.warnings(input, &time, &usage));

        debug!(
            process = %input.process,
            quantity = input.quantity,
            unit_price = %unit_price,
            lead_days,
            warnings = warnings.len(),
            "Calculated price"
        );

        Ok(PricingResult {
            unit_price,
            total_price,
            lead_days,
            cost_breakdown: breakdown,
            sustainability,
            confidence: self.confidence(),
            warnings,
        })
    }

    /// Prices one line item against the current time.
    fn calculate(&self, input: &PricingInput) -> PricingOutcome<PricingResult> {
        self.calculate_at(input, Utc::now())
    }
}

// =============================================================================
// Process Calculator
// =============================================================================

/// The calculators available to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessCalculator {
    Filament(FilamentCalculator),
    Resin(ResinCalculator),
    Cnc(CncCalculator),
    Laser(LaserCalculator),
}

impl ProcessCalculator {
    /// Processes that have a calculator.
    pub const SUPPORTED: [ProcessType; 4] = [
        ProcessType::Fff,
        ProcessType::Sla,
        ProcessType::Cnc3Axis,
        ProcessType::Laser2d,
    ];

    pub fn for_process(process: ProcessType) -> Option<Self> {
        match process {
            ProcessType::Fff => Some(ProcessCalculator::Filament(FilamentCalculator)),
            ProcessType::Sla => Some(ProcessCalculator::Resin(ResinCalculator)),
            ProcessType::Cnc3Axis => Some(ProcessCalculator::Cnc(CncCalculator)),
            ProcessType::Laser2d => Some(ProcessCalculator::Laser(LaserCalculator)),
            ProcessType::Sls
            | ProcessType::Mjf
            | ProcessType::Cnc5Axis
            | ProcessType::SheetMetal => None,
        }
    }

    fn model(&self) -> &dyn ProcessModel {
        match self {
            ProcessCalculator::Filament(calc) => calc,
            ProcessCalculator::Resin(calc) => calc,
            ProcessCalculator::Cnc(calc) => calc,
            ProcessCalculator::Laser(calc) => calc,
        }
    }

    pub fn compute_time(&self, input: &PricingInput) -> Result<ProcessingTime, CostError> {
        self.model().compute_time(input)
    }

    pub fn compute_material_usage(&self, input: &PricingInput) -> MaterialUsage {
        self.model().compute_material_usage(input)
    }

    pub fn calculate_at(
        &self,
        input: &PricingInput,
        now: DateTime<Utc>,
    ) -> PricingOutcome<PricingResult> {
        self.model().calculate_at(input, now)
    }

    pub fn calculate(&self, input: &PricingInput) -> PricingOutcome<PricingResult> {
        self.model().calculate(input)
    }
}

// =============================================================================
// Model Helpers
// =============================================================================

/// Rounds a modeled duration up to whole minutes.
///
/// Negative durations clamp to zero; NaN and infinities are rejected.
pub(crate) fn whole_minutes(minutes: f64, component: &str) -> Result<u32, CostError> {
    if !minutes.is_finite() {
        return Err(CostError::NonFinite {
            component: component.to_string(),
        });
    }
    let rounded = minutes.max(0.0).ceil();
    if rounded > f64::from(u32::MAX) {
        return Err(CostError::NonFinite {
            component: component.to_string(),
        });
    }
    Ok(rounded as u32)
}

/// `value` when it is a usable positive quantity, `default` otherwise.
pub(crate) fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

/// Height over the narrowest footprint side; zero for flat parts.
pub(crate) fn slenderness(input: &PricingInput) -> f64 {
    let bbox = &input.geometry.bbox_mm;
    let base = bbox.x.min(bbox.y);
    if base > 0.0 {
        bbox.z / base
    } else {
        0.0
    }
}
