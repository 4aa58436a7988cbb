use super::ScenarioStore;
use crate::{
    calculator::{SimulationInput, SimulationOutput},
    error::RoiResult,
    scenario::{Scenario, ScenarioDraft},
    types::ScenarioId,
};
use rusqlite::{params, OptionalExtension, Row};

const SCENARIO_COLUMNS: &str = "id, scenario_name,
    monthly_invoice_volume, num_ap_staff, avg_hours_per_invoice, hourly_wage,
    error_rate_manual, error_cost, time_horizon_months, one_time_implementation_cost,
    monthly_savings, payback_months, roi_percentage, net_savings, cumulative_savings";

impl ScenarioStore {
    // ── Scenario ──────────────────────────────────────────────────

    /// Persist a draft and return it with its newly assigned id.
    /// The id comes from AUTOINCREMENT, so ids are never reused.
    pub fn insert_scenario(&mut self, draft: &ScenarioDraft) -> RoiResult<Scenario> {
        let input = draft.input();
        let output = draft.output();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO scenario (
                scenario_name,
                monthly_invoice_volume, num_ap_staff, avg_hours_per_invoice, hourly_wage,
                error_rate_manual, error_cost, time_horizon_months, one_time_implementation_cost,
                monthly_savings, payback_months, roi_percentage, net_savings, cumulative_savings
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                draft.name(),
                input.monthly_invoice_volume,
                input.num_ap_staff,
                input.avg_hours_per_invoice,
                input.hourly_wage,
                input.error_rate_manual,
                input.error_cost,
                input.time_horizon_months,
                input.one_time_implementation_cost,
                output.monthly_savings,
                output.payback_months,
                output.roi_percentage,
                output.net_savings,
                output.cumulative_savings,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Scenario::with_id(id, draft.clone()))
    }

    pub fn get_scenario(&self, id: ScenarioId) -> RoiResult<Option<Scenario>> {
        let sql = format!("SELECT {SCENARIO_COLUMNS} FROM scenario WHERE id = ?1");
        let scenario = self
            .conn
            .query_row(&sql, params![id], scenario_from_row)
            .optional()?;
        Ok(scenario)
    }

    /// Scenarios in creation order, paginated by offset/limit.
    pub fn list_scenarios(&self, offset: usize, limit: usize) -> RoiResult<Vec<Scenario>> {
        let sql = format!(
            "SELECT {SCENARIO_COLUMNS} FROM scenario
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![to_sql_count(limit), to_sql_count(offset)],
            scenario_from_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn scenario_count(&self) -> RoiResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scenario", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn scenario_from_row(row: &Row<'_>) -> rusqlite::Result<Scenario> {
    let input = SimulationInput {
        monthly_invoice_volume: row.get(2)?,
        num_ap_staff: row.get(3)?,
        avg_hours_per_invoice: row.get(4)?,
        hourly_wage: row.get(5)?,
        error_rate_manual: row.get(6)?,
        error_cost: row.get(7)?,
        time_horizon_months: row.get(8)?,
        one_time_implementation_cost: row.get(9)?,
    };
    let output = SimulationOutput {
        monthly_savings: row.get(10)?,
        payback_months: row.get(11)?,
        roi_percentage: row.get(12)?,
        net_savings: row.get(13)?,
        cumulative_savings: row.get(14)?,
    };
    Ok(Scenario::from_stored(row.get(0)?, row.get(1)?, input, output))
}

// SQLite binds i64; anything larger is "no limit" in practice.
fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
