//! # Pricing Engine
//!
//! Entry point that routes line items to their process calculator.
//!
//! ## Batch Pricing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       calculate_batch_async                             │
//! │                                                                         │
//! │  inputs ──► [window 1: N items] ──► [window 2: N items] ──► ...        │
//! │                 │ │ │                                                   │
//! │                 ▼ ▼ ▼   spawn_blocking, awaited in input order         │
//! │             results 1..N                                               │
//! │                                                                         │
//! │  A failing item becomes PricingResult::failed(["Validation failed",    │
//! │  reason...]) and never aborts the rest of the batch.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use fabquote_core::validation::validate_tenant_config;
use fabquote_core::{PricingError, PricingInput, PricingOutcome, PricingResult, ProcessType};
use tracing::{debug, info, warn};

use crate::calculators::ProcessCalculator;
use crate::config::EngineConfig;

/// First warning on every placeholder produced for a failed batch item.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Stateless apart from its configuration; clone freely.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: EngineConfig,
}

impl PricingEngine {
    pub fn new(config: EngineConfig) -> Self {
        PricingEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Single Item
    // =========================================================================

    /// Prices one line item.
    pub fn calculate(&self, input: &PricingInput) -> PricingOutcome<PricingResult> {
        self.calculate_at(input, Utc::now())
    }

    /// Prices one line item with the clock fixed at `now`.
    pub fn calculate_at(
        &self,
        input: &PricingInput,
        now: DateTime<Utc>,
    ) -> PricingOutcome<PricingResult> {
        let calculator = ProcessCalculator::for_process(input.process)
            .ok_or(PricingError::UnsupportedProcess(input.process))?;
        calculator.calculate_at(input, now)
    }

    /// Validates the input structurally, then prices it.
    ///
    /// Unlike [`PricingEngine::calculate`], a structurally invalid input is
    /// rejected up front with [`PricingError::InvalidInput`].
    pub async fn calculate_async(&self, input: &PricingInput) -> PricingOutcome<PricingResult> {
        let errors = self.validate_input(input);
        if !errors.is_empty() {
            return Err(PricingError::InvalidInput(errors));
        }
        self.calculate(input)
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Prices every input in order. Failures are isolated per item.
    pub fn calculate_batch(&self, inputs: &[PricingInput]) -> Vec<PricingResult> {
        self.calculate_batch_at(inputs, Utc::now())
    }

    pub fn calculate_batch_at(
        &self,
        inputs: &[PricingInput],
        now: DateTime<Utc>,
    ) -> Vec<PricingResult> {
        let results: Vec<_> = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| self.price_isolated(index, input, now))
            .collect();

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(items = results.len(), failed, "Batch priced");
        results
    }

    /// Prices `inputs` in windows of `concurrency` items on the blocking pool.
    ///
    /// Results come back in input order. A concurrency of 0 is treated as 1.
    pub async fn calculate_batch_async(
        &self,
        inputs: Vec<PricingInput>,
        concurrency: usize,
    ) -> Vec<PricingResult> {
        let window = concurrency.max(1);
        let now = Utc::now();
        let mut results = Vec::with_capacity(inputs.len());
        let mut pending = inputs.into_iter().enumerate().peekable();

        while pending.peek().is_some() {
            let handles: Vec<_> = pending
                .by_ref()
                .take(window)
                .map(|(index, input)| {
                    let engine = self.clone();
                    tokio::task::spawn_blocking(move || engine.price_isolated(index, &input, now))
                })
                .collect();

            debug!(window = handles.len(), "Pricing batch window");

            for handle in handles {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "Pricing task failed");
                        PricingResult::failed(vec![VALIDATION_FAILED.to_string(), e.to_string()])
                    }
                };
                results.push(result);
            }
        }

        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(items = results.len(), failed, window, "Async batch priced");
        results
    }

    /// [`PricingEngine::calculate_batch_async`] at the configured concurrency.
    pub async fn calculate_batch_concurrent(&self, inputs: Vec<PricingInput>) -> Vec<PricingResult> {
        self.calculate_batch_async(inputs, self.config.batch.concurrency)
            .await
    }

    fn price_isolated(
        &self,
        index: usize,
        input: &PricingInput,
        now: DateTime<Utc>,
    ) -> PricingResult {
        let errors = self.validate_input(input);
        let reasons = if errors.is_empty() {
            match self.calculate_at(input, now) {
                Ok(result) => return result,
                Err(PricingError::InvalidInput(reasons)) => reasons,
                Err(e) => vec![e.to_string()],
            }
        } else {
            errors
        };

        warn!(index, process = %input.process, ?reasons, "Batch item failed");
        let mut warnings = Vec::with_capacity(reasons.len() + 1);
        warnings.push(VALIDATION_FAILED.to_string());
        warnings.extend(reasons);
        PricingResult::failed(warnings)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Structural checks; returns every problem found.
    pub fn validate_input(&self, input: &PricingInput) -> Vec<String> {
        let mut errors = Vec::new();

        if ProcessCalculator::for_process(input.process).is_none() {
            errors.push(format!("Unsupported process type: {}", input.process));
        }
        if !is_positive(input.geometry.volume_cm3) {
            errors.push("Volume must be positive".to_string());
        }
        if !is_positive(input.geometry.surface_area_cm2) {
            errors.push("Surface area must be positive".to_string());
        }
        if input.quantity == 0 {
            errors.push("Quantity must be positive".to_string());
        }
        if input.material.name.trim().is_empty() {
            errors.push("Material is required".to_string());
        }
        if input.machine.name.trim().is_empty() {
            errors.push("Machine is required".to_string());
        }
        if let Err(e) = validate_tenant_config(&input.tenant_config) {
            errors.push(e.to_string());
        }

        errors
    }

    pub fn supported_processes(&self) -> Vec<ProcessType> {
        ProcessCalculator::SUPPORTED.to_vec()
    }
}

/// False for zero, negatives and NaN.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
