//! Shared inputs for unit tests.

use chrono::{DateTime, TimeZone, Utc};
use fabquote_core::{
    BoundingBox, GeometryMetrics, Machine, Material, MaterialFamily, Money, Percent,
    PricingInput, ProcessSelections, ProcessType, Reflectivity, TenantPricingConfig,
    VolumeDiscount,
};
use rust_decimal_macros::dec;

/// Fixed clock for lead-time and rush tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn tenant_config() -> TenantPricingConfig {
    TenantPricingConfig {
        margin_floor_percent: Percent::new(dec!(30)),
        overhead_percent: Percent::new(dec!(15)),
        energy_tariff_per_kwh: Money::new(dec!(0.12)),
        labor_rate_per_hour: Money::new(dec!(25)),
        rush_upcharge_percent: Percent::new(dec!(25)),
        volume_discounts: Vec::new(),
        grid_co2e_factor: dec!(0.4),
        logistics_co2e_factor: dec!(0.0001),
        minimum_charge: Money::zero(),
    }
}

/// 10% from 50 pieces, 15% from 100.
pub fn tenant_config_with_tiers() -> TenantPricingConfig {
    TenantPricingConfig {
        volume_discounts: vec![
            VolumeDiscount::new(50, Percent::new(dec!(10))),
            VolumeDiscount::new(100, Percent::new(dec!(15))),
        ],
        ..tenant_config()
    }
}

fn machine(name: &str, power_w: f64, hourly_rate: Money, setup_minutes: u32) -> Machine {
    Machine {
        name: name.to_string(),
        power_w,
        hourly_rate,
        setup_minutes,
        work_envelope_mm: None,
        max_thickness_mm: None,
    }
}

fn material(name: &str, family: MaterialFamily, density_g_cm3: f64, price: Money) -> Material {
    Material {
        name: name.to_string(),
        family,
        density_g_cm3,
        price_per_uom: price,
        co2e_factor: dec!(2.0),
        recycled_percent: 0.0,
        thickness_mm: None,
        reflectivity: Reflectivity::Low,
        organic: None,
    }
}

fn input(
    process: ProcessType,
    geometry: GeometryMetrics,
    material: Material,
    machine: Machine,
    quantity: u32,
) -> PricingInput {
    PricingInput {
        process,
        geometry,
        material,
        machine,
        selections: ProcessSelections::default(),
        quantity,
        required_by: None,
        tenant_config: tenant_config(),
    }
}

/// 10 cm³ PLA part on a 120 W printer, 35% infill at 0.2 mm.
pub fn filament_input(quantity: u32) -> PricingInput {
    let mut input = input(
        ProcessType::Fff,
        GeometryMetrics {
            volume_cm3: 10.0,
            surface_area_cm2: 30.0,
            bbox_mm: BoundingBox::new(30.0, 30.0, 20.0),
            ..Default::default()
        },
        material("PLA Basic", MaterialFamily::Thermoplastic, 1.24, Money::new(dec!(25))),
        machine("Prusa MK4", 120.0, Money::new(dec!(15)), 10),
        quantity,
    );
    input.selections.infill_percent = Some(35.0);
    input.selections.layer_height_mm = Some(0.2);
    input
}

/// 5 cm³ standard resin part, 15 mm tall.
pub fn resin_input(quantity: u32) -> PricingInput {
    input(
        ProcessType::Sla,
        GeometryMetrics {
            volume_cm3: 5.0,
            surface_area_cm2: 25.0,
            bbox_mm: BoundingBox::new(20.0, 20.0, 15.0),
            ..Default::default()
        },
        material("Standard Grey", MaterialFamily::Photopolymer, 1.1, Money::new(dec!(80))),
        machine("Form 3", 65.0, Money::new(dec!(12)), 5),
        quantity,
    )
}

/// 45 cm³ aluminum bracket, 60 × 50 × 25 mm.
pub fn cnc_input(quantity: u32) -> PricingInput {
    input(
        ProcessType::Cnc3Axis,
        GeometryMetrics {
            volume_cm3: 45.0,
            surface_area_cm2: 120.0,
            bbox_mm: BoundingBox::new(60.0, 50.0, 25.0),
            ..Default::default()
        },
        material("Al 6061", MaterialFamily::Aluminum, 2.7, Money::new(dec!(8))),
        machine("Haas VF-2", 3000.0, Money::new(dec!(60)), 20),
        quantity,
    )
}

/// 100 cm² panel out of 3 mm acrylic with two holes.
pub fn laser_input(quantity: u32) -> PricingInput {
    let mut sheet = material("Acrylic", MaterialFamily::Acrylic, 1.19, Money::new(dec!(40)));
    sheet.thickness_mm = Some(3.0);

    let mut laser = machine("Epilog Fusion", 1000.0, Money::new(dec!(30)), 5);
    laser.max_thickness_mm = Some(20.0);

    input(
        ProcessType::Laser2d,
        GeometryMetrics {
            volume_cm3: 30.0,
            surface_area_cm2: 100.0,
            bbox_mm: BoundingBox::new(100.0, 100.0, 3.0),
            cut_length_mm: Some(400.0),
            holes_count: Some(2),
            ..Default::default()
        },
        sheet,
        laser,
        quantity,
    )
}
