//! Scenario repository — the entry point front ends talk to.
//!
//! Owns the calculator and the store. `create` is the only mutating
//! operation; the store mutex plus the SQLite transaction make id
//! assignment atomic, so concurrent creates never share an id and a
//! returned record is always visible to a later `get`.

use crate::{
    calculator::{Calculator, SimulationInput, SimulationOutput},
    error::{RoiError, RoiResult},
    report::{self, ReportRequest},
    scenario::{Scenario, ScenarioDraft},
    store::ScenarioStore,
    types::ScenarioId,
};
use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

pub struct ScenarioRepository {
    store: Mutex<ScenarioStore>,
    calculator: Calculator,
}

impl ScenarioRepository {
    /// Wrap a store. Runs migrations so the schema is always present.
    pub fn new(store: ScenarioStore, calculator: Calculator) -> RoiResult<Self> {
        store.migrate()?;
        Ok(Self {
            store: Mutex::new(store),
            calculator,
        })
    }

    /// In-memory repository with default calculator parameters (tests).
    pub fn in_memory() -> RoiResult<Self> {
        Self::new(ScenarioStore::in_memory()?, Calculator::default())
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Validate and compute without persisting anything.
    pub fn simulate(&self, input: &SimulationInput) -> RoiResult<SimulationOutput> {
        let output = match self.calculator.checked_compute(input) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("Rejected simulation input: {e}");
                return Err(e);
            }
        };
        log::debug!("Simulated {input:?} -> {output:?}");
        Ok(output)
    }

    pub fn create(&self, name: &str, input: SimulationInput) -> RoiResult<Scenario> {
        let draft = match ScenarioDraft::new(name, input, &self.calculator) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Rejected scenario '{name}': {e}");
                return Err(e);
            }
        };
        let scenario = self.lock_store()?.insert_scenario(&draft)?;
        log::info!("Scenario {} created: '{}'", scenario.id(), scenario.name());
        Ok(scenario)
    }

    /// Fetch a stored scenario exactly as persisted (no recomputation).
    pub fn get(&self, id: ScenarioId) -> RoiResult<Scenario> {
        self.lock_store()?
            .get_scenario(id)?
            .ok_or(RoiError::ScenarioNotFound { id })
    }

    /// Scenarios in creation order.
    pub fn list(&self, offset: usize, limit: usize) -> RoiResult<Vec<Scenario>> {
        self.lock_store()?.list_scenarios(offset, limit)
    }

    pub fn count(&self) -> RoiResult<i64> {
        self.lock_store()?.scenario_count()
    }

    /// Render the report for a stored scenario into `reports_dir`.
    pub fn generate_report(
        &self,
        request: &ReportRequest,
        reports_dir: impl AsRef<Path>,
    ) -> RoiResult<PathBuf> {
        request.validate()?;
        let scenario = self.get(request.scenario_id)?;
        let path = report::write_report(&scenario, &request.email, reports_dir)?;
        log::info!(
            "Report for scenario {} written to {}",
            scenario.id(),
            path.display()
        );
        Ok(path)
    }

    fn lock_store(&self) -> RoiResult<MutexGuard<'_, ScenarioStore>> {
        self.store
            .lock()
            .map_err(|_| RoiError::Other(anyhow::anyhow!("scenario store lock poisoned")))
    }
}
