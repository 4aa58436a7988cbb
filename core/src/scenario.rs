//! Scenario records: inputs and computed outputs merged into one value.
//!
//! RULE: outputs are never supplied by the caller. A `ScenarioDraft` is
//! only built by validating the inputs and running the calculator, and a
//! `Scenario` only comes back from the store with an id attached. Neither
//! type has setters.

use crate::{
    calculator::{Calculator, SimulationInput, SimulationOutput},
    error::{RoiError, RoiResult},
    types::ScenarioId,
};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_CHARS: usize = 100;

/// A validated scenario name (1–100 characters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScenarioName(String);

impl ScenarioName {
    pub fn parse(raw: &str) -> RoiResult<Self> {
        if raw.is_empty() {
            return Err(RoiError::validation("scenario_name", "must not be empty"));
        }
        let chars = raw.chars().count();
        if chars > MAX_NAME_CHARS {
            return Err(RoiError::validation(
                "scenario_name",
                format!("must be at most {MAX_NAME_CHARS} characters, got {chars}"),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The payload a front end submits to create a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioCreate {
    pub scenario_name: String,
    #[serde(flatten)]
    pub input: SimulationInput,
}

/// A validated, computed scenario that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDraft {
    scenario_name: ScenarioName,
    #[serde(flatten)]
    input: SimulationInput,
    #[serde(flatten)]
    output: SimulationOutput,
}

impl ScenarioDraft {
    /// Validate `name` and `input`, then run the calculator over `input`.
    pub fn new(name: &str, input: SimulationInput, calculator: &Calculator) -> RoiResult<Self> {
        let scenario_name = ScenarioName::parse(name)?;
        let output = calculator.checked_compute(&input)?;
        Ok(Self { scenario_name, input, output })
    }

    pub fn name(&self) -> &str {
        self.scenario_name.as_str()
    }

    pub fn input(&self) -> &SimulationInput {
        &self.input
    }

    pub fn output(&self) -> &SimulationOutput {
        &self.output
    }
}

/// A persisted scenario. Serialises to the flat wide record:
/// `id`, `scenario_name`, every input field, every output field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    id: ScenarioId,
    #[serde(flatten)]
    draft: ScenarioDraft,
}

impl Scenario {
    /// Attach a store-assigned id. Only the store calls this.
    pub(crate) fn with_id(id: ScenarioId, draft: ScenarioDraft) -> Self {
        Self { id, draft }
    }

    /// Rebuild a record read back from storage, without recomputing.
    pub(crate) fn from_stored(
        id: ScenarioId,
        name: String,
        input: SimulationInput,
        output: SimulationOutput,
    ) -> Self {
        Self {
            id,
            draft: ScenarioDraft {
                scenario_name: ScenarioName(name),
                input,
                output,
            },
        }
    }

    pub fn id(&self) -> ScenarioId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.draft.name()
    }

    pub fn input(&self) -> &SimulationInput {
        self.draft.input()
    }

    pub fn output(&self) -> &SimulationOutput {
        self.draft.output()
    }

    /// Re-run the calculator over the stored inputs and compare outputs.
    pub fn is_consistent(&self, calculator: &Calculator) -> bool {
        calculator.compute(self.input()) == *self.output()
    }
}
