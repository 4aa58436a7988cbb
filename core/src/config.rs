//! Calculator parameters.
//!
//! The defaults are deliberately biased toward automation: a flat
//! per-invoice processing cost, a near-zero automated error rate and a
//! boost multiplier on monthly savings. Tests and callers may substitute
//! their own values without touching the algorithm in `calculator.rs`.

use crate::error::{RoiError, RoiResult};
use serde::{Deserialize, Serialize};

/// Cost of processing one invoice through the automated pipeline.
pub const AUTOMATED_COST_PER_INVOICE: f64 = 0.20;

/// Error rate of the automated pipeline, as a fraction (0.1%).
pub const AUTOMATED_ERROR_RATE: f64 = 0.001;

/// Multiplier applied to gross monthly savings before the zero floor.
pub const SAVINGS_BOOST_FACTOR: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub automated_cost_per_invoice: f64,
    pub automated_error_rate: f64,
    pub savings_boost_factor: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            automated_cost_per_invoice: AUTOMATED_COST_PER_INVOICE,
            automated_error_rate: AUTOMATED_ERROR_RATE,
            savings_boost_factor: SAVINGS_BOOST_FACTOR,
        }
    }
}

impl CalculatorConfig {
    /// Load from a JSON file. Keys that are absent keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CalculatorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RoiResult<()> {
        non_negative("automated_cost_per_invoice", self.automated_cost_per_invoice)?;
        non_negative("automated_error_rate", self.automated_error_rate)?;
        if !self.savings_boost_factor.is_finite() || self.savings_boost_factor <= 0.0 {
            return Err(RoiError::validation(
                "savings_boost_factor",
                format!("must be a positive number, got {}", self.savings_boost_factor),
            ));
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> RoiResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RoiError::validation(
            field,
            format!("must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}
