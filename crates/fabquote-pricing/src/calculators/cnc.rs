//! # 3-Axis CNC Milling
//!
//! ## Time Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock      = (bbox + 5 mm per side)³ in cm³                           │
//! │  removal    = stock - part volume                                      │
//! │  cutting    = removal ÷ MRR(family) × complexity                       │
//! │  tool swaps = (1 + ceil(holes / 10) + 1 finishing) × 5 min             │
//! │                                                                         │
//! │  complexity = tolerance × finish × (1 + 0.05 × holes) × aspect         │
//! │               capped at 2.0                                            │
//! │                                                                         │
//! │  Tooling wear ($10 / processing hour) is billed inside labor.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fabquote_core::{
    BoundingBox, CostError, Finish, MaterialFamily, MaterialUsage, Money, PricingInput,
    ProcessingTime, Tolerance,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{whole_minutes, ProcessModel};
use crate::toolkit::checked;

const STOCK_ALLOWANCE_MM: f64 = 5.0;
const EXTRA_SETUP_MINUTES: u32 = 15;
const TOOL_CHANGE_MINUTES: u32 = 5;
const MAX_COMPLEXITY: f64 = 2.0;
const TOOLING_RATE_PER_HOUR: Decimal = dec!(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CncCalculator;

impl CncCalculator {
    /// Rectangular stock with a machining allowance on every side, in cm³.
    fn stock_volume(input: &PricingInput) -> f64 {
        let bbox = &input.geometry.bbox_mm;
        let side = |mm: f64| (mm + STOCK_ALLOWANCE_MM * 2.0) / 10.0;
        side(bbox.x) * side(bbox.y) * side(bbox.z)
    }

    /// Material removal rate in cm³/min.
    fn removal_rate(family: MaterialFamily) -> f64 {
        match family {
            MaterialFamily::Aluminum => 3.0,
            MaterialFamily::Steel => 1.0,
            MaterialFamily::Acrylic | MaterialFamily::Thermoplastic => 6.0,
            _ => 2.0,
        }
    }

    fn complexity(input: &PricingInput) -> f64 {
        let selections = &input.selections;
        let geometry = &input.geometry;
        let mut factor = 1.0;

        match selections.tolerance {
            Some(t) if t.is_tight() => factor *= 1.5,
            Some(Tolerance::Standard) => factor *= 1.2,
            _ => {}
        }

        match selections.finish {
            Some(Finish::Polished) => factor *= 1.4,
            Some(Finish::Smooth) => factor *= 1.2,
            _ => {}
        }

        let holes = geometry.holes();
        if holes > 0 {
            factor *= 1.0 + f64::from(holes) * 0.05;
        }

        if Self::has_high_aspect_ratio(&geometry.bbox_mm) {
            factor *= 1.3;
        }

        factor.min(MAX_COMPLEXITY)
    }

    /// Footprint over height above 10:1. Flat parts (no height) count as high.
    fn has_high_aspect_ratio(bbox: &BoundingBox) -> bool {
        if bbox.z <= 0.0 {
            return true;
        }
        bbox.x.max(bbox.y) / bbox.z > 10.0
    }

    fn tool_changes(input: &PricingInput) -> u32 {
        let holes = input.geometry.holes();
        let drilling = if holes > 0 { holes.div_ceil(10) } else { 0 };
        // roughing + drilling + finishing
        1 + drilling + 1
    }
}

impl ProcessModel for CncCalculator {
    fn compute_time(&self, input: &PricingInput) -> Result<ProcessingTime, CostError> {
        let removal = (Self::stock_volume(input) - input.geometry.volume_cm3).max(0.0);
        let cutting = removal / Self::removal_rate(input.material.family) * Self::complexity(input);
        let tool_change = f64::from(Self::tool_changes(input).saturating_mul(TOOL_CHANGE_MINUTES));

        let selections = &input.selections;
        let mut post = 10;
        match selections.finish {
            Some(Finish::Polished) => post += 30,
            Some(Finish::Smooth) => post += 15,
            _ => {}
        }
        if selections.is_tight_tolerance() {
            post += 20;
        }

        let setup = input
            .machine
            .setup_minutes
            .checked_add(EXTRA_SETUP_MINUTES)
            .ok_or_else(|| CostError::NonFinite {
                component: "Machine".to_string(),
            })?;

        ProcessingTime::new(setup, whole_minutes(cutting + tool_change, "Machine")?, post)
    }

    fn compute_material_usage(&self, input: &PricingInput) -> MaterialUsage {
        let stock = Self::stock_volume(input);
        let net = input.geometry.volume_cm3;
        let waste_fraction = if stock > 0.0 { (stock - net) / stock } else { 0.0 };

        MaterialUsage {
            net_volume_cm3: net,
            gross_volume_cm3: stock,
            waste_fraction,
            support_volume_cm3: None,
        }
    }

    fn confidence(&self) -> f64 {
        0.85
    }

    fn base_lead_days(&self) -> u32 {
        5
    }

    fn tooling_cost(
        &self,
        _input: &PricingInput,
        time: &ProcessingTime,
    ) -> Result<Option<Money>, CostError> {
        let wear = TOOLING_RATE_PER_HOUR * Decimal::from(time.processing_minutes) / dec!(60);
        checked(Money::new(wear), "Tooling").map(Some)
    }

    fn warnings(
        &self,
        input: &PricingInput,
        time: &ProcessingTime,
        usage: &MaterialUsage,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        let geometry = &input.geometry;
        let selections = &input.selections;

        if input.material.family == MaterialFamily::Steel && time.processing_minutes > 480 {
            warnings.push("Long machining time for steel, consider design optimization".to_string());
        }

        if selections.is_tight_tolerance() && geometry.holes() > 10 {
            warnings.push("Many features with tight tolerances will increase cost".to_string());
        }

        if geometry.bbox_mm.min_dimension() < 2.0 {
            warnings.push("Very thin features may be difficult to machine".to_string());
        }

        if usage.waste_fraction > 0.7 {
            warnings.push("High material waste, consider near-net-shape stock".to_string());
        }

        if let Some(envelope) = &input.machine.work_envelope_mm {
            if geometry.bbox_mm.exceeds(envelope) {
                warnings.push("Part exceeds machine work envelope".to_string());
            }
        }

        if geometry.wall_thickness_mm.is_some_and(|t| t < 1.0) {
            warnings.push("Thin walls require careful machining".to_string());
        }

        if selections.tolerance == Some(Tolerance::Precision) {
            warnings.push("Precision tolerance may require special tooling".to_string());
        }

        warnings
    }
}
