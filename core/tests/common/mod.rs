//! Shared fixtures for integration tests.
#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use roi_core::calculator::SimulationInput;

/// The worked example: 1000 invoices, 2 staff, 0.5h each at $20/h,
/// 3% manual errors at $50, 12 months, $5000 implementation.
pub fn reference_input() -> SimulationInput {
    SimulationInput {
        monthly_invoice_volume: 1000,
        num_ap_staff: 2,
        avg_hours_per_invoice: 0.5,
        hourly_wage: 20.0,
        error_rate_manual: 3.0,
        error_cost: 50.0,
        time_horizon_months: 12,
        one_time_implementation_cost: 5000.0,
    }
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{what}: expected {expected}, got {actual}"
    );
}

/// Seeded generator of constraint-satisfying inputs.
/// Same seed, same sequence.
pub struct InputSampler {
    inner: Pcg64Mcg,
}

impl InputSampler {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    pub fn next_input(&mut self) -> SimulationInput {
        let rng = &mut self.inner;
        SimulationInput {
            monthly_invoice_volume: rng.gen_range(1..=50_000),
            num_ap_staff: rng.gen_range(1..=40),
            avg_hours_per_invoice: rng.gen_range(0.001..4.0),
            hourly_wage: rng.gen_range(0.01..120.0),
            error_rate_manual: rng.gen_range(0.0..=100.0),
            error_cost: rng.gen_range(0.01..500.0),
            time_horizon_months: rng.gen_range(1..=120),
            // A quarter of the draws have no implementation cost.
            one_time_implementation_cost: if rng.gen_bool(0.25) {
                0.0
            } else {
                rng.gen_range(0.0..250_000.0)
            },
        }
    }
}
