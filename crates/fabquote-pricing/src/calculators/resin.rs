//! Resin (SLA) printing.
//!
//! ```text
//! layers      = ceil(height / layer height)
//! processing  = ceil(layers × (8 s exposure + 3 s peel) / 60)
//! support     = 2 mm raft + 5% islands (+15% with overhangs)
//! gross       = (net + support) / 0.92 packing efficiency
//! ```

use fabquote_core::{CostError, MaterialUsage, PricingInput, ProcessingTime};

use super::{positive_or, slenderness, whole_minutes, ProcessModel};

const DEFAULT_LAYER_HEIGHT_MM: f64 = 0.05;
const SECONDS_PER_LAYER: f64 = 8.0 + 3.0;
const RAFT_THICKNESS_MM: f64 = 2.0;
const ISLAND_SUPPORT_FRACTION: f64 = 0.05;
const OVERHANG_SUPPORT_FRACTION: f64 = 0.15;
const PACKING_EFFICIENCY: f64 = 0.92;
/// Failed prints and tank cleaning. Reported only; the gross volume already
/// carries the packing loss.
const WASTE_FRACTION: f64 = 0.08;
const TYPICAL_BUILD_HEIGHT_MM: f64 = 200.0;
/// Absorbs float noise so an exact multiple of the layer height is not
/// rounded up to an extra layer.
const LAYER_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResinCalculator;

impl ResinCalculator {
    fn layer_count(input: &PricingInput) -> f64 {
        let layer = positive_or(input.selections.layer_height_mm, DEFAULT_LAYER_HEIGHT_MM);
        (input.geometry.bbox_mm.z / layer - LAYER_EPSILON).ceil().max(0.0)
    }

    fn support_volume(input: &PricingInput) -> f64 {
        let geometry = &input.geometry;
        let raft = geometry.bbox_mm.footprint_mm2() * RAFT_THICKNESS_MM / 1000.0;
        let mut support = raft + geometry.volume_cm3 * ISLAND_SUPPORT_FRACTION;
        if geometry.has_overhangs() {
            support += geometry.volume_cm3 * OVERHANG_SUPPORT_FRACTION;
        }
        support
    }
}

impl ProcessModel for ResinCalculator {
    fn compute_time(&self, input: &PricingInput) -> Result<ProcessingTime, CostError> {
        let print_minutes = Self::layer_count(input) * SECONDS_PER_LAYER / 60.0;

        // wash + support removal + UV cure
        let mut post = 10 + 15 + 30;
        if input.geometry.surface_area_cm2 > 100.0 {
            post += 10;
        }

        ProcessingTime::new(
            input.machine.setup_minutes,
            whole_minutes(print_minutes, "Machine")?,
            post,
        )
    }

    fn compute_material_usage(&self, input: &PricingInput) -> MaterialUsage {
        let net = input.geometry.volume_cm3;
        let support = Self::support_volume(input);

        MaterialUsage {
            net_volume_cm3: net,
            gross_volume_cm3: (net + support) / PACKING_EFFICIENCY,
            waste_fraction: WASTE_FRACTION,
            support_volume_cm3: Some(support),
        }
    }

    fn confidence(&self) -> f64 {
        0.95
    }

    fn base_lead_days(&self) -> u32 {
        4
    }

    fn warnings(
        &self,
        input: &PricingInput,
        _time: &ProcessingTime,
        usage: &MaterialUsage,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        let bbox = &input.geometry.bbox_mm;

        match &input.machine.work_envelope_mm {
            Some(envelope) if bbox.exceeds(envelope) => {
                warnings.push("Part exceeds build volume".to_string());
            }
            Some(_) => {}
            None if bbox.z > TYPICAL_BUILD_HEIGHT_MM => {
                warnings.push("Part height may exceed typical SLA build volume".to_string());
            }
            None => {}
        }

        if input.selections.is_tight_tolerance() {
            warnings.push("Tight tolerances may require manual finishing".to_string());
        }

        if usage.gross_volume_cm3 > 500.0 {
            warnings.push("Large resin volume may require multiple batches".to_string());
        }

        if usage.support_volume() > usage.net_volume_cm3 * 0.5 {
            warnings.push("Extensive supports required, consider part orientation".to_string());
        }

        if slenderness(input) > 10.0 {
            warnings.push("Tall part may require special supports".to_string());
        }

        warnings
    }
}
