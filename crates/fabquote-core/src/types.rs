//! # Domain Types
//!
//! Inputs and outputs of a pricing calculation.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Pricing Types                                   │
//! │                                                                         │
//! │  INPUT (built fresh per request by the caller)                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ PricingInput                                                      │  │
//! │  │  ├── process: ProcessType                                         │  │
//! │  │  ├── geometry: GeometryMetrics   (from geometry analysis)         │  │
//! │  │  ├── material: Material          (from catalog)                   │  │
//! │  │  ├── machine: Machine            (from catalog)                   │  │
//! │  │  ├── selections: ProcessSelections                                │  │
//! │  │  ├── quantity, required_by                                        │  │
//! │  │  └── tenant_config: TenantPricingConfig (immutable snapshot)      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  DERIVED (never persisted)                                              │
//! │    ProcessingTime, MaterialUsage                                        │
//! │                                                                         │
//! │  OUTPUT (immutable, returned once)                                      │
//! │    PricingResult ── CostBreakdown                                       │
//! │                  └─ SustainabilityResult ── Co2eBreakdown               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CostError;
use crate::money::{Money, Percent};

// =============================================================================
// Process Type
// =============================================================================

/// Manufacturing processes known to the quoting system.
///
/// Only some of them have a calculator; see the pricing engine's
/// `supported_processes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProcessType {
    /// Filament (fused deposition) 3D printing.
    #[serde(rename = "FFF")]
    Fff,
    /// Resin (stereolithography) 3D printing.
    #[serde(rename = "SLA")]
    Sla,
    /// Selective laser sintering.
    #[serde(rename = "SLS")]
    Sls,
    /// Multi jet fusion.
    #[serde(rename = "MJF")]
    Mjf,
    /// 3-axis CNC milling.
    #[serde(rename = "CNC_3AXIS")]
    Cnc3Axis,
    /// 5-axis CNC milling.
    #[serde(rename = "CNC_5AXIS")]
    Cnc5Axis,
    /// 2D laser cutting of sheet stock.
    #[serde(rename = "LASER_2D")]
    Laser2d,
    /// Sheet metal forming.
    #[serde(rename = "SHEET_METAL")]
    SheetMetal,
}

impl ProcessType {
    /// Wire identifier, identical to the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Fff => "FFF",
            ProcessType::Sla => "SLA",
            ProcessType::Sls => "SLS",
            ProcessType::Mjf => "MJF",
            ProcessType::Cnc3Axis => "CNC_3AXIS",
            ProcessType::Cnc5Axis => "CNC_5AXIS",
            ProcessType::Laser2d => "LASER_2D",
            ProcessType::SheetMetal => "SHEET_METAL",
        }
    }
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned bounding box in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        BoundingBox { x, y, z }
    }

    pub fn max_dimension(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    pub fn min_dimension(&self) -> f64 {
        self.x.min(self.y).min(self.z)
    }

    /// Footprint area on the build plate / sheet, in mm².
    pub fn footprint_mm2(&self) -> f64 {
        self.x * self.y
    }

    /// True when any axis of `self` is larger than the same axis of `envelope`.
    pub fn exceeds(&self, envelope: &BoundingBox) -> bool {
        self.x > envelope.x || self.y > envelope.y || self.z > envelope.z
    }
}

/// Precomputed part geometry, owned by the geometry-analysis collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryMetrics {
    pub volume_cm3: f64,
    pub surface_area_cm2: f64,
    pub bbox_mm: BoundingBox,

    /// Total cutting path length (laser).
    #[serde(default)]
    pub cut_length_mm: Option<f64>,

    /// Number of pierces (laser). Estimated from holes and cut length when absent.
    #[serde(default)]
    pub pierce_count: Option<u32>,

    #[serde(default)]
    pub holes_count: Option<u32>,

    /// Area needing support (printing). Zero or absent means self-supporting.
    #[serde(default)]
    pub overhang_area_cm2: Option<f64>,

    /// Thinnest wall found by analysis (CNC).
    #[serde(default)]
    pub wall_thickness_mm: Option<f64>,

    /// Known sheet nesting efficiency (laser), in (0, 1].
    #[serde(default)]
    pub nesting_efficiency: Option<f64>,

    #[serde(default)]
    pub requires_repositioning: bool,
}

impl GeometryMetrics {
    pub fn has_overhangs(&self) -> bool {
        self.overhang_area_cm2.is_some_and(|a| a > 0.0)
    }

    pub fn holes(&self) -> u32 {
        self.holes_count.unwrap_or(0)
    }
}

// =============================================================================
// Material
// =============================================================================

/// Material property class used for process lookups (removal rate, cutting
/// speed). Lookups never key on the catalog name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    /// PLA, PETG, ABS, nylon filaments and machinable plastics.
    Thermoplastic,
    /// Photopolymer resins.
    Photopolymer,
    /// Cast or extruded acrylic (PMMA).
    Acrylic,
    /// MDF, HDF and other engineered wood boards.
    Fiberboard,
    /// Plywood and natural wood sheet.
    Plywood,
    Aluminum,
    Steel,
    #[default]
    Other,
}

/// Optical reflectivity at common laser wavelengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Reflectivity {
    #[default]
    Low,
    Medium,
    High,
}

/// A catalog material record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,

    #[serde(default)]
    pub family: MaterialFamily,

    pub density_g_cm3: f64,

    /// Price per unit of measure: per kg for bulk stock, per m² (at 3 mm)
    /// for laser sheet stock.
    pub price_per_uom: Money,

    /// kg CO2e emitted per kg of material.
    pub co2e_factor: Decimal,

    #[serde(default)]
    pub recycled_percent: f64,

    /// Nominal sheet thickness, when the material is sold as sheet.
    #[serde(default)]
    pub thickness_mm: Option<f64>,

    #[serde(default)]
    pub reflectivity: Reflectivity,

    /// Explicit organic flag. Defaults from the family when absent.
    #[serde(default)]
    pub organic: Option<bool>,
}

impl Material {
    /// Wood-based materials char and smoke under the beam.
    pub fn is_organic(&self) -> bool {
        self.organic.unwrap_or(matches!(
            self.family,
            MaterialFamily::Fiberboard | MaterialFamily::Plywood
        ))
    }
}

// =============================================================================
// Machine
// =============================================================================

/// A catalog machine record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,

    /// Average electrical draw while processing.
    pub power_w: f64,

    pub hourly_rate: Money,

    pub setup_minutes: u32,

    /// Build volume (printers) or work envelope (CNC), when known.
    #[serde(default)]
    pub work_envelope_mm: Option<BoundingBox>,

    /// Thickest sheet the machine can cut (laser).
    #[serde(default)]
    pub max_thickness_mm: Option<f64>,
}

// =============================================================================
// Process Selections
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    Standard,
    Tight,
    Precision,
}

impl Tolerance {
    /// Tight and precision tolerances both slow cutting and add inspection.
    pub fn is_tight(&self) -> bool {
        matches!(self, Tolerance::Tight | Tolerance::Precision)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    AsMachined,
    Smooth,
    Polished,
}

/// Customer-selected process knobs.
///
/// Knobs the calculators read are typed; anything else is preserved in
/// `extra` so the selection bag round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessSelections {
    #[serde(default)]
    pub material: Option<String>,

    #[serde(default)]
    pub tolerance: Option<Tolerance>,

    #[serde(default)]
    pub finish: Option<Finish>,

    #[serde(default)]
    pub layer_height_mm: Option<f64>,

    /// Infill density in percent (filament).
    #[serde(default)]
    pub infill_percent: Option<f64>,

    #[serde(default)]
    pub material_thickness_mm: Option<f64>,

    #[serde(default)]
    pub supports_required: Option<bool>,

    #[serde(default)]
    pub engraving: bool,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProcessSelections {
    pub fn is_tight_tolerance(&self) -> bool {
        self.tolerance.is_some_and(|t| t.is_tight())
    }
}

// =============================================================================
// Tenant Configuration
// =============================================================================

/// A (minimum quantity, discount percent) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumeDiscount {
    pub min_quantity: u32,
    pub discount_percent: Percent,
}

impl VolumeDiscount {
    pub const fn new(min_quantity: u32, discount_percent: Percent) -> Self {
        VolumeDiscount {
            min_quantity,
            discount_percent,
        }
    }
}

/// A tenant's business rules, treated as an immutable snapshot per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TenantPricingConfig {
    /// Minimum profit over total cost, must be > 0.
    pub margin_floor_percent: Percent,

    pub overhead_percent: Percent,

    pub energy_tariff_per_kwh: Money,

    pub labor_rate_per_hour: Money,

    pub rush_upcharge_percent: Percent,

    /// Discount tiers, non-decreasing in percent as quantity grows.
    #[serde(default)]
    pub volume_discounts: Vec<VolumeDiscount>,

    /// kg CO2e per kWh of grid electricity.
    #[ts(type = "string")]
    pub grid_co2e_factor: Decimal,

    /// kg CO2e per kg·100 km of freight.
    #[ts(type = "string")]
    pub logistics_co2e_factor: Decimal,

    /// Lowest unit price ever quoted. Zero disables the floor.
    #[serde(default)]
    pub minimum_charge: Money,
}

// =============================================================================
// Pricing Input
// =============================================================================

/// Everything needed to price one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    pub process: ProcessType,
    pub geometry: GeometryMetrics,
    pub material: Material,
    pub machine: Machine,
    #[serde(default)]
    pub selections: ProcessSelections,
    pub quantity: u32,
    #[serde(default)]
    pub required_by: Option<DateTime<Utc>>,
    pub tenant_config: TenantPricingConfig,
}

// =============================================================================
// Derived Quantities
// =============================================================================

/// Machine and operator time for one part, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProcessingTime {
    pub setup_minutes: u32,
    pub processing_minutes: u32,
    pub post_processing_minutes: u32,
    pub total_minutes: u32,
}

impl ProcessingTime {
    /// Sums the three phases into `total_minutes`.
    ///
    /// A total that does not fit in `u32` minutes is rejected as a
    /// non-finite machine cost.
    pub fn new(
        setup_minutes: u32,
        processing_minutes: u32,
        post_processing_minutes: u32,
    ) -> Result<Self, CostError> {
        let total_minutes = setup_minutes
            .checked_add(processing_minutes)
            .and_then(|minutes| minutes.checked_add(post_processing_minutes))
            .ok_or_else(|| CostError::NonFinite {
                component: "Machine".to_string(),
            })?;

        Ok(ProcessingTime {
            setup_minutes,
            processing_minutes,
            post_processing_minutes,
            total_minutes,
        })
    }

    /// Attended minutes (setup and post-processing).
    pub fn labor_minutes(&self) -> u32 {
        self.setup_minutes.saturating_add(self.post_processing_minutes)
    }
}

/// Material consumed by one part.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialUsage {
    pub net_volume_cm3: f64,
    /// Net volume plus waste, support and stock allowance.
    pub gross_volume_cm3: f64,
    pub waste_fraction: f64,
    pub support_volume_cm3: Option<f64>,
}

impl MaterialUsage {
    /// Share of gross material that does not end up in the part.
    pub fn waste_percent(&self) -> f64 {
        if self.gross_volume_cm3 <= 0.0 {
            return 0.0;
        }
        (self.gross_volume_cm3 - self.net_volume_cm3) / self.gross_volume_cm3 * 100.0
    }

    pub fn support_volume(&self) -> f64 {
        self.support_volume_cm3.unwrap_or(0.0)
    }
}

// =============================================================================
// Pricing Output
// =============================================================================

/// Itemized unit price.
///
/// Invariant: `material + machine + energy + labor + overhead + margin -
/// discount == unit price`. `tooling` is informational and already counted
/// inside `labor`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBreakdown {
    pub material: Money,
    pub machine: Money,
    pub energy: Money,
    pub labor: Money,
    pub overhead: Money,
    pub margin: Money,
    pub tooling: Option<Money>,
    pub discount: Option<Money>,
}

impl CostBreakdown {
    /// Sum of the five cost components (excludes margin and discount).
    pub fn total_cost(&self) -> Money {
        self.material + self.machine + self.energy + self.labor + self.overhead
    }

    /// The unit price the breakdown adds up to.
    pub fn unit_price(&self) -> Money {
        self.total_cost() + self.margin - self.discount.unwrap_or_default()
    }
}

/// CO2e emissions by source, in kg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Co2eBreakdown {
    #[ts(type = "string")]
    pub material: Decimal,
    #[ts(type = "string")]
    pub energy: Decimal,
    #[ts(type = "string")]
    pub logistics: Decimal,
    #[ts(type = "string")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SustainabilityResult {
    /// Composite 0-100 score.
    pub score: u8,
    pub co2e: Co2eBreakdown,
    #[ts(type = "string")]
    pub energy_kwh: Decimal,
    pub recycled_percent: f64,
    pub waste_percent: f64,
}

/// The quote for one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub unit_price: Money,
    /// `unit_price × quantity`.
    pub total_price: Money,
    pub lead_days: u32,
    pub cost_breakdown: CostBreakdown,
    pub sustainability: SustainabilityResult,
    /// Process model certainty in [0, 1].
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl PricingResult {
    /// Placeholder result for an item that could not be priced.
    ///
    /// Zero prices, zero confidence; the reasons are in `warnings`.
    pub fn failed(warnings: Vec<String>) -> Self {
        PricingResult {
            unit_price: Money::zero(),
            total_price: Money::zero(),
            lead_days: 0,
            cost_breakdown: CostBreakdown::default(),
            sustainability: SustainabilityResult::default(),
            confidence: 0.0,
            warnings,
        }
    }

    /// True for placeholders built by [`PricingResult::failed`].
    pub fn is_failed(&self) -> bool {
        self.confidence == 0.0 && self.unit_price.is_zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
