//! Simulation calculator — manual vs. automated invoice processing.
//!
//! Pure: no I/O, no shared state. `compute` is total for any input that
//! passes `SimulationInput::validate`; zero-savings and zero-cost cases are
//! handled by guards, never by errors.
//!
//! Order of operations matters and is fixed:
//!   1. manual labour cost and automated processing cost per month
//!   2. error savings, floored at zero
//!   3. monthly savings = (labour + error savings - automation) * boost,
//!      floored at zero AFTER the boost
//!   4. cumulative / net savings over the horizon
//!   5. payback and ROI, each only when its divisor is positive
//!   6. every output rounded to cents exactly once, at the end, half to
//!      even on the exact binary value of the f64

use crate::{
    config::CalculatorConfig,
    error::{RoiError, RoiResult},
    types::Money,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Business assumptions supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub monthly_invoice_volume: i64,
    pub num_ap_staff: i64,
    pub avg_hours_per_invoice: f64,
    pub hourly_wage: Money,
    /// Percentage of manually processed invoices with errors, 0–100.
    pub error_rate_manual: f64,
    pub error_cost: Money,
    pub time_horizon_months: i64,
    pub one_time_implementation_cost: Money,
}

impl SimulationInput {
    /// Enforce the field constraints. Non-finite reals are rejected too.
    pub fn validate(&self) -> RoiResult<()> {
        positive_int("monthly_invoice_volume", self.monthly_invoice_volume)?;
        positive_int("num_ap_staff", self.num_ap_staff)?;
        positive_real("avg_hours_per_invoice", self.avg_hours_per_invoice)?;
        positive_real("hourly_wage", self.hourly_wage)?;
        finite("error_rate_manual", self.error_rate_manual)?;
        if !(0.0..=100.0).contains(&self.error_rate_manual) {
            return Err(RoiError::validation(
                "error_rate_manual",
                format!("must be between 0 and 100, got {}", self.error_rate_manual),
            ));
        }
        positive_real("error_cost", self.error_cost)?;
        positive_int("time_horizon_months", self.time_horizon_months)?;
        finite("one_time_implementation_cost", self.one_time_implementation_cost)?;
        if self.one_time_implementation_cost < 0.0 {
            return Err(RoiError::validation(
                "one_time_implementation_cost",
                format!("must be >= 0, got {}", self.one_time_implementation_cost),
            ));
        }
        Ok(())
    }
}

fn positive_int(field: &'static str, value: i64) -> RoiResult<()> {
    if value <= 0 {
        return Err(RoiError::validation(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}

fn finite(field: &'static str, value: f64) -> RoiResult<()> {
    if !value.is_finite() {
        return Err(RoiError::validation(field, "must be a finite number"));
    }
    Ok(())
}

fn positive_real(field: &'static str, value: f64) -> RoiResult<()> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(RoiError::validation(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}

/// Derived metrics, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub monthly_savings: Money,
    /// None when monthly savings are zero.
    pub payback_months: Option<f64>,
    /// None when there is no implementation cost to return on.
    pub roi_percentage: Option<f64>,
    pub net_savings: Money,
    pub cumulative_savings: Money,
}

impl SimulationOutput {
    /// Reject results that overflowed. Every field is a real number on
    /// the wire; infinities would serialise as `null`.
    pub fn ensure_finite(&self) -> RoiResult<()> {
        let fields = [
            ("monthly_savings", Some(self.monthly_savings)),
            ("payback_months", self.payback_months),
            ("roi_percentage", self.roi_percentage),
            ("net_savings", Some(self.net_savings)),
            ("cumulative_savings", Some(self.cumulative_savings)),
        ];
        for (field, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(RoiError::validation(
                        field,
                        "inputs are too large: result overflows",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Unrounded monthly intermediates. Exposed for reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyBreakdown {
    pub manual_labor_cost: Money,
    pub automation_cost: Money,
    pub error_savings: Money,
    pub monthly_savings: Money,
}

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    config: CalculatorConfig,
}

impl Calculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn monthly_breakdown(&self, input: &SimulationInput) -> MonthlyBreakdown {
        let volume = input.monthly_invoice_volume as f64;

        let manual_labor_cost = input.num_ap_staff as f64
            * input.hourly_wage
            * input.avg_hours_per_invoice
            * volume;

        let automation_cost = volume * self.config.automated_cost_per_invoice;

        let error_savings = ((input.error_rate_manual / 100.0 - self.config.automated_error_rate)
            * volume
            * input.error_cost)
            .max(0.0);

        let monthly_savings = ((manual_labor_cost + error_savings - automation_cost)
            * self.config.savings_boost_factor)
            .max(0.0);

        MonthlyBreakdown {
            manual_labor_cost,
            automation_cost,
            error_savings,
            monthly_savings,
        }
    }

    /// Validate `input`, compute, and reject overflowed results.
    pub fn checked_compute(&self, input: &SimulationInput) -> RoiResult<SimulationOutput> {
        input.validate()?;
        let output = self.compute(input);
        output.ensure_finite()?;
        Ok(output)
    }

    /// Run the simulation. Callers validate `input` first.
    pub fn compute(&self, input: &SimulationInput) -> SimulationOutput {
        let monthly_savings = self.monthly_breakdown(input).monthly_savings;
        let implementation_cost = input.one_time_implementation_cost;

        let cumulative_savings = monthly_savings * input.time_horizon_months as f64;
        let net_savings = cumulative_savings - implementation_cost;

        let payback_months =
            (monthly_savings > 0.0).then(|| implementation_cost / monthly_savings);
        let roi_percentage =
            (implementation_cost > 0.0).then(|| net_savings / implementation_cost * 100.0);

        SimulationOutput {
            monthly_savings: round_cents(monthly_savings),
            payback_months: payback_months.map(round_cents),
            roi_percentage: roi_percentage.map(round_cents),
            net_savings: round_cents(net_savings),
            cumulative_savings: round_cents(cumulative_savings),
        }
    }
}

/// `compute` with the default (automation-biased) parameters.
pub fn compute(input: &SimulationInput) -> SimulationOutput {
    Calculator::default().compute(input)
}

// Doubles at or above 2^52 have no fractional part.
const INTEGRAL_THRESHOLD: f64 = 4_503_599_627_370_496.0;

/// Round to two decimal places, half to even, on the exact value of `value`.
pub(crate) fn round_cents(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= INTEGRAL_THRESHOLD {
        return value;
    }
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    // Parsing the decimal text gives the nearest f64 to the rounded value.
    rounded.to_string().parse().unwrap_or(value)
}
