//! Filament (FFF) printing.
//!
//! Time is deposited volume over a fixed deposition rate; fine layers pay a
//! quality penalty. Material is infill volume plus support, with a flat 5%
//! purge and brim waste.

use fabquote_core::{CostError, MaterialUsage, PricingInput, ProcessingTime};

use super::{positive_or, slenderness, whole_minutes, ProcessModel};

const DEPOSITION_RATE_CM3_PER_HOUR: f64 = 12.0;
const DEFAULT_LAYER_HEIGHT_MM: f64 = 0.2;
const DEFAULT_INFILL_PERCENT: f64 = 35.0;
const FINE_LAYER_MM: f64 = 0.1;
const FINE_LAYER_PENALTY: f64 = 1.5;
const SUPPORT_FRACTION: f64 = 0.10;
const WASTE_FRACTION: f64 = 0.05;
const TYPICAL_BUILD_MM: f64 = 250.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilamentCalculator;

impl FilamentCalculator {
    fn layer_height(input: &PricingInput) -> f64 {
        positive_or(input.selections.layer_height_mm, DEFAULT_LAYER_HEIGHT_MM)
    }

    fn infill_fraction(input: &PricingInput) -> f64 {
        let percent = input
            .selections
            .infill_percent
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(DEFAULT_INFILL_PERCENT);
        percent.min(100.0) / 100.0
    }

    fn needs_support(input: &PricingInput) -> bool {
        input
            .selections
            .supports_required
            .unwrap_or_else(|| input.geometry.has_overhangs())
    }
}

impl ProcessModel for FilamentCalculator {
    fn compute_time(&self, input: &PricingInput) -> Result<ProcessingTime, CostError> {
        let deposited_cm3 = input.geometry.volume_cm3 * Self::infill_fraction(input);
        let quality = if Self::layer_height(input) <= FINE_LAYER_MM {
            FINE_LAYER_PENALTY
        } else {
            1.0
        };
        let print_minutes = deposited_cm3 / DEPOSITION_RATE_CM3_PER_HOUR * 60.0 * quality;

        // bed removal + support removal + cleanup
        let mut post = 5 + 5;
        if Self::needs_support(input) {
            post += 10;
        }

        ProcessingTime::new(
            input.machine.setup_minutes,
            whole_minutes(print_minutes, "Machine")?,
            post,
        )
    }

    fn compute_material_usage(&self, input: &PricingInput) -> MaterialUsage {
        let net = input.geometry.volume_cm3 * Self::infill_fraction(input);
        let support = if Self::needs_support(input) {
            input.geometry.volume_cm3 * SUPPORT_FRACTION
        } else {
            0.0
        };

        MaterialUsage {
            net_volume_cm3: net,
            gross_volume_cm3: (net + support) * (1.0 + WASTE_FRACTION),
            waste_fraction: WASTE_FRACTION,
            support_volume_cm3: Some(support),
        }
    }

    fn confidence(&self) -> f64 {
        0.95
    }

    fn base_lead_days(&self) -> u32 {
        3
    }

    fn warnings(
        &self,
        input: &PricingInput,
        time: &ProcessingTime,
        usage: &MaterialUsage,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        let bbox = &input.geometry.bbox_mm;

        let oversized = match &input.machine.work_envelope_mm {
            Some(envelope) => bbox.exceeds(envelope),
            None => bbox.max_dimension() > TYPICAL_BUILD_MM,
        };
        if oversized {
            warnings.push("Part dimensions exceed typical build volume".to_string());
        }

        if time.processing_minutes > 24 * 60 {
            warnings.push("Print time exceeds 24 hours".to_string());
        }

        if input
            .selections
            .layer_height_mm
            .is_some_and(|h| h > 0.0 && h < FINE_LAYER_MM)
        {
            warnings.push("Very fine layer height will significantly increase print time".to_string());
        }

        if usage.support_volume() > usage.net_volume_cm3 * 0.3 {
            warnings.push("Significant support material required".to_string());
        }

        if slenderness(input) > 10.0 {
            warnings.push("Tall part may require special handling".to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use fabquote_core::{BoundingBox, Money, Percent, VolumeDiscount};
    use rust_decimal_macros::dec;

    #[test]
    fn test_example_part() {
        let input = fixtures::filament_input(1);
        let time = FilamentCalculator.compute_time(&input).unwrap();
        // 10 cm³ × 35% = 3.5 cm³ at 12 cm³/h = 17.5 min
        assert_eq!(time.processing_minutes, 18);
        assert_eq!(time.setup_minutes, 10);
        assert_eq!(time.post_processing_minutes, 10);

        let result = FilamentCalculator
            .calculate_at(&input, fixtures::now())
            .unwrap();
        assert!(result.unit_price.is_positive());
        assert_eq!(result.lead_days, 3);
        assert_eq!(result.confidence, 0.95);
        assert!(result.cost_breakdown.discount.is_none());
    }

    #[test]
    fn test_volume_discount_lowers_unit_price() {
        let single = FilamentCalculator
            .calculate_at(&fixtures::filament_input(1), fixtures::now())
            .unwrap();

        let mut input = fixtures::filament_input(100);
        input.tenant_config.volume_discounts = vec![
            VolumeDiscount::new(50, Percent::new(dec!(10))),
            VolumeDiscount::new(100, Percent::new(dec!(15))),
        ];
        let bulk = FilamentCalculator.calculate_at(&input, fixtures::now()).unwrap();

        assert!(bulk.unit_price < single.unit_price);
        let discount = bulk.cost_breakdown.discount.unwrap();
        assert!(discount.is_positive());
        assert_eq!(bulk.lead_days, 7);
    }

    #[test]
    fn test_rush_order() {
        let standard = FilamentCalculator
            .calculate_at(&fixtures::filament_input(1), fixtures::now())
            .unwrap();

        let mut input = fixtures::filament_input(1);
        input.required_by = Some(fixtures::now() + chrono::Duration::days(1));
        let rush = FilamentCalculator.calculate_at(&input, fixtures::now()).unwrap();

        let ratio = rush.unit_price.amount() / standard.unit_price.amount();
        assert_eq!(ratio, dec!(1.25));
        assert_eq!(rush.lead_days, 2);
        assert!(rush
            .warnings
            .contains(&"Rush order upcharge applied".to_string()));
    }

    #[test]
    fn test_fine_layers_slow_the_print() {
        let mut input = fixtures::filament_input(1);
        input.selections.layer_height_mm = Some(0.08);
        let time = FilamentCalculator.compute_time(&input).unwrap();
        // 17.5 min × 1.5
        assert_eq!(time.processing_minutes, 27);

        let result = FilamentCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(result
            .warnings
            .contains(&"Very fine layer height will significantly increase print time".to_string()));
    }

    #[test]
    fn test_supports_from_overhangs() {
        let mut input = fixtures::filament_input(1);
        input.geometry.overhang_area_cm2 = Some(4.0);

        let usage = FilamentCalculator.compute_material_usage(&input);
        assert!((usage.support_volume() - 1.0).abs() < 1e-9);
        assert!((usage.gross_volume_cm3 - 4.5 * 1.05).abs() < 1e-9);

        let time = FilamentCalculator.compute_time(&input).unwrap();
        assert_eq!(time.post_processing_minutes, 20);
    }

    #[test]
    fn test_explicit_no_supports_overrides_geometry() {
        let mut input = fixtures::filament_input(1);
        input.geometry.overhang_area_cm2 = Some(4.0);
        input.selections.supports_required = Some(false);
        let usage = FilamentCalculator.compute_material_usage(&input);
        assert_eq!(usage.support_volume(), 0.0);
    }

    #[test]
    fn test_large_and_tall_part_warnings() {
        let mut input = fixtures::filament_input(1);
        input.geometry.volume_cm3 = 2.0;
        input.geometry.bbox_mm = BoundingBox::new(10.0, 10.0, 300.0);

        let result = FilamentCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(result
            .warnings
            .contains(&"Part dimensions exceed typical build volume".to_string()));
        assert!(result
            .warnings
            .contains(&"Tall part may require special handling".to_string()));
    }

    #[test]
    fn test_long_print_warning() {
        let mut input = fixtures::filament_input(1);
        input.geometry.volume_cm3 = 1000.0;
        input.selections.infill_percent = Some(100.0);
        let result = FilamentCalculator.calculate_at(&input, fixtures::now()).unwrap();
        assert!(result
            .warnings
            .contains(&"Print time exceeds 24 hours".to_string()));
    }

    #[test]
    fn test_all_zero_costs_rejected() {
        let mut input = fixtures::filament_input(1);
        input.geometry.volume_cm3 = 0.0;
        input.machine.setup_minutes = 0;
        input.machine.hourly_rate = Money::zero();
        input.tenant_config.labor_rate_per_hour = Money::zero();

        let err = FilamentCalculator
            .calculate_at(&input, fixtures::now())
            .unwrap_err();
        assert!(err.to_string().contains("Total cost cannot be zero"));
    }
}
