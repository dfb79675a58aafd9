//! # fabquote-pricing: Process Calculators & Pricing Engine
//!
//! Prices filament, resin, CNC and laser parts from precomputed geometry,
//! catalog records and a tenant's pricing rules.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Pricing a Line Item                             │
//! │                                                                         │
//! │  PricingInput                                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  PricingEngine ── for_process() ──► ProcessCalculator                  │
//! │      │                                  │                               │
//! │      │                    ┌─────────────┼─────────────┐                 │
//! │      │                    ▼             ▼             ▼                 │
//! │      │              compute_time  material_usage   warnings            │
//! │      │                    │             │                               │
//! │      │                    └──────┬──────┘                               │
//! │      │                           ▼                                      │
//! │      │                     CostToolkit                                  │
//! │      │         costs → margin → discount → rush → minimum              │
//! │      │         → margin validation → sustainability → lead time        │
//! │      ▼                                                                  │
//! │  PricingResult (or PricingError)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - `PricingEngine`: single, batch and async batch pricing
//! - [`calculators`] - One physical model per process
//! - [`toolkit`] - Shared cost, margin and sustainability math
//! - [`config`] - Engine settings and tenant config loading
//! - [`error`] - Config loading errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fabquote_pricing::{load_tenant_config, EngineConfig, PricingEngine};
//!
//! let engine = PricingEngine::new(EngineConfig::load_or_default(None));
//! input.tenant_config = load_tenant_config(Path::new("tenants/acme.toml"))?;
//!
//! let result = engine.calculate(&input)?;
//! println!("{} each, ready in {} days", result.unit_price, result.lead_days);
//!
//! let results = engine.calculate_batch_concurrent(inputs).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculators;
pub mod config;
pub mod engine;
pub mod error;
pub mod toolkit;

#[cfg(test)]
pub(crate) mod fixtures;

// =============================================================================
// Re-exports
// =============================================================================

pub use calculators::{
    CncCalculator, FilamentCalculator, LaserCalculator, ProcessCalculator, ProcessModel,
    ResinCalculator,
};
pub use config::{load_tenant_config, BatchSettings, EngineConfig};
pub use engine::PricingEngine;
pub use error::{ConfigLoadError, ConfigLoadResult};
pub use toolkit::CostToolkit;
