//! # 2D Laser Cutting
//!
//! Sheet stock is sold by area, so this model overrides the mass-based
//! material cost.
//!
//! ## Time Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  speed     = table(family, thickness) × reflectivity factor   [mm/s]   │
//! │  pierce    = table(thickness)                                  [s]     │
//! │  pierces   = geometry count, else 1 + holes + floor(cut / 500)         │
//! │                                                                         │
//! │  processing = ceil((cut / speed + pierces × pierce) / 60 + engraving)  │
//! │                                                                         │
//! │  Tables are piecewise linear between 3, 6, 10 and 20 mm and clamp      │
//! │  outside that range.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sheet Usage
//! ```text
//! part area   = surface area, else bbox footprint
//! sheet area  = part area / nesting efficiency (default 0.85)
//! material $  = sheet m² × price per m² × thickness / 3 mm
//! ```

use fabquote_core::money::to_decimal;
use fabquote_core::{
    CostError, MaterialFamily, MaterialUsage, Money, PricingInput, ProcessingTime, Reflectivity,
};

use super::{whole_minutes, ProcessModel};
use crate::toolkit::{checked, CostToolkit};

/// (thickness mm, speed mm/s)
type SpeedTable = &'static [(f64, f64)];

const ACRYLIC_SPEEDS: SpeedTable = &[(3.0, 15.0), (6.0, 8.0), (10.0, 4.0), (20.0, 1.5)];
const FIBERBOARD_SPEEDS: SpeedTable = &[(3.0, 20.0), (6.0, 10.0), (10.0, 5.0), (20.0, 2.0)];
const PLYWOOD_SPEEDS: SpeedTable = &[(3.0, 18.0), (6.0, 9.0), (10.0, 4.5), (20.0, 1.8)];

/// (thickness mm, seconds per pierce)
const PIERCE_TIMES: SpeedTable = &[(3.0, 0.5), (6.0, 1.0), (10.0, 2.0), (20.0, 4.0)];

const DEFAULT_THICKNESS_MM: f64 = 3.0;
/// Thickness the sheet price is quoted at.
const PRICED_THICKNESS_MM: f64 = 3.0;
const DEFAULT_NESTING_EFFICIENCY: f64 = 0.85;
const CUT_PER_FEATURE_MM: f64 = 500.0;
const ENGRAVED_SURFACE_FRACTION: f64 = 0.2;
const ENGRAVING_RATE_CM2_PER_MIN: f64 = 50.0;
const SHEET_LIMIT_CM2: f64 = 10_000.0;
const SHEET_LIMIT_MM2: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaserCalculator;

impl LaserCalculator {
    /// Selected thickness, then the material's nominal sheet, then 3 mm.
    fn thickness(input: &PricingInput) -> f64 {
        [
            input.selections.material_thickness_mm,
            input.material.thickness_mm,
        ]
        .into_iter()
        .flatten()
        .find(|t| t.is_finite() && *t > 0.0)
        .unwrap_or(DEFAULT_THICKNESS_MM)
    }

    fn speed_table(family: MaterialFamily) -> SpeedTable {
        match family {
            MaterialFamily::Fiberboard => FIBERBOARD_SPEEDS,
            MaterialFamily::Plywood => PLYWOOD_SPEEDS,
            _ => ACRYLIC_SPEEDS,
        }
    }

    fn cutting_speed(input: &PricingInput, thickness: f64) -> f64 {
        let factor = match input.material.reflectivity {
            Reflectivity::High => 0.7,
            Reflectivity::Medium => 0.85,
            Reflectivity::Low => 1.0,
        };
        interpolate(Self::speed_table(input.material.family), thickness) * factor
    }

    fn pierce_count(input: &PricingInput) -> u32 {
        let geometry = &input.geometry;
        geometry.pierce_count.unwrap_or_else(|| {
            let features = geometry.cut_length_mm.map_or(0.0, |cut| (cut / CUT_PER_FEATURE_MM).floor());
            1u32
                .saturating_add(geometry.holes())
                .saturating_add(features.max(0.0) as u32)
        })
    }

    fn needs_repositioning(input: &PricingInput) -> bool {
        input.geometry.requires_repositioning
            || input.geometry.bbox_mm.footprint_mm2() > SHEET_LIMIT_MM2
    }

    fn part_area_cm2(input: &PricingInput) -> f64 {
        let geometry = &input.geometry;
        if geometry.surface_area_cm2 > 0.0 {
            geometry.surface_area_cm2
        } else {
            geometry.bbox_mm.footprint_mm2() / 100.0
        }
    }

    fn nesting_efficiency(input: &PricingInput) -> f64 {
        input
            .geometry
            .nesting_efficiency
            .filter(|e| *e > 0.0 && *e <= 1.0)
            .unwrap_or(DEFAULT_NESTING_EFFICIENCY)
    }

    /// Sheet area consumed, recovered from the gross volume.
    fn sheet_area_cm2(usage: &MaterialUsage, thickness: f64) -> f64 {
        usage.gross_volume_cm3 / (thickness / 10.0)
    }
}

/// Piecewise-linear lookup, clamped to the first and last entries.
fn interpolate(table: SpeedTable, x: f64) -> f64 {
    let Some(&(x0, y0)) = table.first() else {
        return 0.0;
    };
    if x <= x0 {
        return y0;
    }
    for pair in table.windows(2) {
        let ((lo_x, lo_y), (hi_x, hi_y)) = (pair[0], pair[1]);
        if x <= hi_x {
            return lo_y + (x - lo_x) / (hi_x - lo_x) * (hi_y - lo_y);
        }
    }
    table.last().map_or(y0, |&(_, y)| y)
}

impl ProcessModel for LaserCalculator {
    fn compute_time(&self, input: &PricingInput) -> Result<ProcessingTime, CostError> {
        let thickness = Self::thickness(input);
        let cut_mm = input.geometry.cut_length_mm.unwrap_or(0.0).max(0.0);

        let cutting_seconds = cut_mm / Self::cutting_speed(input, thickness);
        let pierce_seconds = f64::from(Self::pierce_count(input)) * interpolate(PIERCE_TIMES, thickness);
        let engraving_minutes = if input.selections.engraving {
            input.geometry.surface_area_cm2 * ENGRAVED_SURFACE_FRACTION / ENGRAVING_RATE_CM2_PER_MIN
        } else {
            0.0
        };

        let mut post = 5;
        if Self::needs_repositioning(input) {
            post += 10;
        }

        ProcessingTime::new(
            input.machine.setup_minutes,
            whole_minutes(
                (cutting_seconds + pierce_seconds) / 60.0 + engraving_minutes,
                "Machine",
            )?,
            post,
        )
    }

    fn compute_material_usage(&self, input: &PricingInput) -> MaterialUsage {
        let thickness_cm = Self::thickness(input) / 10.0;
        let part_area = Self::part_area_cm2(input);
        let sheet_area = part_area / Self::nesting_efficiency(input);

        let net = part_area * thickness_cm;
        let gross = sheet_area * thickness_cm;
        let waste_fraction = if gross > 0.0 { (gross - net) / gross } else { 0.0 };

        MaterialUsage {
            net_volume_cm3: net,
            gross_volume_cm3: gross,
            waste_fraction,
            support_volume_cm3: None,
        }
    }

    fn confidence(&self) -> f64 {
        0.98
    }

    fn base_lead_days(&self) -> u32 {
        2
    }

    fn material_cost(
        &self,
        toolkit: &CostToolkit<'_>,
        usage: &MaterialUsage,
    ) -> Result<Money, CostError> {
        let input = toolkit.input();
        let thickness = Self::thickness(input);
        let area_m2 = to_decimal(Self::sheet_area_cm2(usage, thickness) / 10_000.0, "Material")?;
        let thickness_scale = to_decimal(thickness / PRICED_THICKNESS_MM, "Material")?;

        checked(
            input.material.price_per_uom * (area_m2 * thickness_scale),
            "Material",
        )
    }

    fn warnings(
        &self,
        input: &PricingInput,
        _time: &ProcessingTime,
        usage: &MaterialUsage,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        let thickness = Self::thickness(input);
        let material = &input.material;

        if input
            .machine
            .max_thickness_mm
            .is_some_and(|max| thickness > max)
        {
            warnings.push("Material thickness exceeds machine capability".to_string());
        }

        if material.family == MaterialFamily::Acrylic && thickness > 10.0 {
            warnings.push("Thick acrylic may require multiple passes".to_string());
        }

        if material.is_organic() && thickness >= 6.0 {
            warnings.push("Organic material may require multiple passes".to_string());
        }

        if material.reflectivity == Reflectivity::High {
            warnings.push("Reflective material requires reduced cutting speed".to_string());
        }

        if input.selections.is_tight_tolerance() {
            warnings.push(format!(
                "Minimum feature size is {}mm for this thickness",
                thickness * 0.5
            ));
        }

        if input.geometry.cut_length_mm.is_some_and(|cut| cut > 5000.0) {
            warnings.push("Complex cutting path may affect edge quality".to_string());
        }

        if Self::sheet_area_cm2(usage, thickness) > SHEET_LIMIT_CM2 || Self::needs_repositioning(input) {
            warnings.push("Large part may require sheet repositioning".to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use fabquote_core::{BoundingBox, Tolerance};
    use rust_decimal_macros::dec;

    fn has(warnings: &[String], text: &str) -> bool {
        warnings.iter().any(|w| w == text)
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate(ACRYLIC_SPEEDS, 3.0), 15.0);
        assert_eq!(interpolate(ACRYLIC_SPEEDS, 4.5), 11.5);
        assert_eq!(interpolate(ACRYLIC_SPEEDS, 8.0), 6.0);
        assert_eq!(interpolate(ACRYLIC_SPEEDS, 1.0), 15.0);
        assert_eq!(interpolate(ACRYLIC_SPEEDS, 40.0), 1.5);
        assert_eq!(interpolate(PIERCE_TIMES, 15.0), 3.0);
    }

    #[test]
    fn test_thickness_fallbacks() {
        let mut input = fixtures::laser_input(1);
        input.selections.material_thickness_mm = Some(6.0);
        assert_eq!(LaserCalculator::thickness(&input), 6.0);

        input.selections.material_thickness_mm = None;
        input.material.thickness_mm = Some(10.0);
        assert_eq!(LaserCalculator::thickness(&input), 10.0);

        input.material.thickness_mm = Some(0.0);
        assert_eq!(LaserCalculator::thickness(&input), 3.0);
    }

    #[test]
    fn test_pierce_estimate() {
        let mut input = fixtures::laser_input(1);
        // outer contour + 2 holes, 400 mm cut adds no features
        assert_eq!(LaserCalculator::pierce_count(&input), 3);

        input.geometry.cut_length_mm = Some(1200.0);
        assert_eq!(LaserCalculator::pierce_count(&input), 5);

        input.geometry.pierce_count = Some(40);
        assert_eq!(LaserCalculator::pierce_count(&input), 40);
    }

    #[test]
    fn test_pierce_estimate_saturates() {
        let mut input = fixtures::laser_input(1);
        input.geometry.holes_count = Some(u32::MAX);
        assert_eq!(LaserCalculator::pierce_count(&input), u32::MAX);

        input.geometry.holes_count = Some(0);
        input.geometry.cut_length_mm = Some(1e300);
        assert_eq!(LaserCalculator::pierce_count(&input), u32::MAX);
    }

    #[test]
    fn test_cutting_time() {
        let mut input = fixtures::laser_input(1);
        input.geometry.cut_length_mm = Some(6000.0);
        // 6000 / 15 = 400 s, 15 pierces × 0.5 s
        let time = LaserCalculator.compute_time(&input).unwrap();
        assert_eq!(time.processing_minutes, 7);
        assert_eq!(time.post_processing_minutes, 5);

        input.geometry.pierce_count = Some(100);
        let time = LaserCalculator.compute_time(&input).unwrap();
        assert_eq!(time.processing_minutes, 8);
    }

    #[test]
    fn test_engraving_adds_time() {
        let mut input = fixtures::laser_input(1);
        input.geometry.surface_area_cm2 = 1000.0;
        assert_eq!(LaserCalculator.compute_time(&input).unwrap().processing_minutes, 1);

        input.selections.engraving = true;
        // 1000 × 0.2 / 50 = 4 min
        assert_eq!(LaserCalculator.compute_time(&input).unwrap().processing_minutes, 5);
    }

    #[test]
    fn test_sheet_usage() {
        let input = fixtures::laser_input(1);
        let usage = LaserCalculator.compute_material_usage(&input);
        assert!((usage.net_volume_cm3 - 30.0).abs() < 1e-9);
        assert!((usage.gross_volume_cm3 - 30.0 / 0.85).abs() < 1e-9);
        assert!((usage.waste_fraction - 0.15).abs() < 1e-9);

        let mut nested = input.clone();
        nested.geometry.nesting_efficiency = Some(0.5);
        let usage = LaserCalculator.compute_material_usage(&nested);
        assert!((usage.gross_volume_cm3 - 60.0).abs() < 1e-9);

        let mut bogus = input;
        bogus.geometry.nesting_efficiency = Some(1.5);
        let usage = LaserCalculator.compute_material_usage(&bogus);
        assert!((usage.gross_volume_cm3 - 30.0 / 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_material_priced_by_area() {
        let input = fixtures::laser_input(1);
        let result = LaserCalculator.calculate_at(&input, fixtures::now()).unwrap();
        // 100 cm² / 0.85 = 0.01176 m² at $40/m²
        let material = result.cost_breakdown.material.amount();
        assert!(material > dec!(0.470) && material < dec!(0.471), "{material}");

        let mut thick = input;
        thick.selections.material_thickness_mm = Some(6.0);
        let thick_result = LaserCalculator.calculate_at(&thick, fixtures::now()).unwrap();
        let doubled = thick_result.cost_breakdown.material.amount();
        assert!((doubled - material * dec!(2)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_result() {
        let result = LaserCalculator
            .calculate_at(&fixtures::laser_input(1), fixtures::now())
            .unwrap();
        assert_eq!(result.confidence, 0.98);
        assert_eq!(result.lead_days, 2);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_thickness_warnings() {
        let mut input = fixtures::laser_input(1);
        input.selections.material_thickness_mm = Some(25.0);
        let result = LaserCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(has(&result.warnings, "Material thickness exceeds machine capability"));
        assert!(has(&result.warnings, "Thick acrylic may require multiple passes"));

        input.material.family = MaterialFamily::Plywood;
        input.selections.material_thickness_mm = Some(6.0);
        let result = LaserCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(has(&result.warnings, "Organic material may require multiple passes"));
        assert!(!has(&result.warnings, "Thick acrylic may require multiple passes"));
    }

    #[test]
    fn test_material_and_tolerance_warnings() {
        let mut input = fixtures::laser_input(1);
        input.material.reflectivity = Reflectivity::High;
        input.selections.tolerance = Some(Tolerance::Tight);
        input.geometry.cut_length_mm = Some(5200.0);

        let result = LaserCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(has(&result.warnings, "Reflective material requires reduced cutting speed"));
        assert!(has(&result.warnings, "Minimum feature size is 1.5mm for this thickness"));
        assert!(has(&result.warnings, "Complex cutting path may affect edge quality"));
    }

    #[test]
    fn test_reflective_material_cuts_slower() {
        let mut input = fixtures::laser_input(1);
        input.geometry.cut_length_mm = Some(6000.0);
        let normal = LaserCalculator.compute_time(&input).unwrap();

        input.material.reflectivity = Reflectivity::High;
        let reflective = LaserCalculator.compute_time(&input).unwrap();
        // 6000 / 10.5 + 7.5 s
        assert_eq!(reflective.processing_minutes, 10);
        assert!(reflective.processing_minutes > normal.processing_minutes);
    }

    #[test]
    fn test_large_sheet_repositioning() {
        let mut input = fixtures::laser_input(1);
        input.geometry.surface_area_cm2 = 0.0;
        input.geometry.bbox_mm = BoundingBox::new(1200.0, 1000.0, 3.0);

        let time = LaserCalculator.compute_time(&input).unwrap();
        assert_eq!(time.post_processing_minutes, 15);
        let result = LaserCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(has(&result.warnings, "Large part may require sheet repositioning"));
    }
}
