//! roi-runner: headless front end for the invoice automation ROI engine.
//!
//! Usage:
//!   roi-runner --input assumptions.json
//!   roi-runner --input assumptions.json --name "Q3 pilot" --db scenarios.db
//!   roi-runner --ipc-mode --db scenarios.db --reports-dir reports
//!
//! In IPC mode one JSON command is read per line from stdin and one JSON
//! response is written per line to stdout.

use anyhow::{bail, Result};
use roi_core::{
    calculator::{Calculator, SimulationInput, SimulationOutput},
    config::CalculatorConfig,
    error::{RoiError, RoiResult},
    report::ReportRequest,
    repository::{ScenarioRepository, DEFAULT_PAGE_LIMIT},
    scenario::ScenarioCreate,
    store::ScenarioStore,
    types::ScenarioId,
};
use std::env;
use std::io::{self, BufRead, Write};

const IN_MEMORY_DB: &str = ":memory:";

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Simulate {
        input: SimulationInput,
    },
    CreateScenario(ScenarioCreate),
    ListScenarios {
        #[serde(default)]
        skip: usize,
        #[serde(default = "default_limit")]
        limit: usize,
    },
    GetScenario {
        scenario_id: ScenarioId,
    },
    GenerateReport(ReportRequest),
    Quit,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

struct RunnerConfig {
    db: String,
    config_path: Option<String>,
    reports_dir: String,
    ipc_mode: bool,
    input_path: Option<String>,
    name: Option<String>,
}

impl RunnerConfig {
    fn from_args(args: &[String]) -> Self {
        Self {
            db: string_arg(args, "--db").unwrap_or_else(|| IN_MEMORY_DB.to_string()),
            config_path: string_arg(args, "--config"),
            reports_dir: string_arg(args, "--reports-dir").unwrap_or_else(|| "reports".to_string()),
            ipc_mode: args.iter().any(|a| a == "--ipc-mode"),
            input_path: string_arg(args, "--input"),
            name: string_arg(args, "--name"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = RunnerConfig::from_args(&args);

    let calculator_config = match &config.config_path {
        Some(path) => CalculatorConfig::load(path)?,
        None => CalculatorConfig::default(),
    };
    let store = open_store(&config.db)?;
    let repo = ScenarioRepository::new(store, Calculator::new(calculator_config))?;
    log::debug!("Calculator parameters: {:?}", repo.calculator().config());

    if config.ipc_mode {
        return run_ipc_loop(&repo, &config.reports_dir);
    }

    let Some(input_path) = &config.input_path else {
        bail!("nothing to do: pass --ipc-mode or --input <file.json>");
    };

    println!("Invoice automation ROI runner");
    println!("  input:  {input_path}");
    println!("  db:     {}", config.db);
    println!();

    let content = std::fs::read_to_string(input_path)
        .map_err(|e| anyhow::anyhow!("Cannot read {input_path}: {e}"))?;
    let input: SimulationInput = serde_json::from_str(&content)?;

    let output = repo.simulate(&input)?;
    print_summary(&input, &output);

    if let Some(name) = &config.name {
        let scenario = repo.create(name, input)?;
        println!();
        println!("Saved as scenario {} ('{}')", scenario.id(), scenario.name());
    }
    Ok(())
}

fn run_ipc_loop(repo: &ScenarioRepository, reports_dir: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd = match parse_command(&buffer) {
            Ok(c) => c,
            Err(err_json) => {
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = match handle_command(repo, cmd, reports_dir) {
            Ok(value) => value,
            Err(e) => error_response(&e),
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}

/// `:memory:` is a private in-memory database; anything else is a file
/// path or SQLite URI.
fn open_store(db: &str) -> RoiResult<ScenarioStore> {
    if db == IN_MEMORY_DB {
        ScenarioStore::in_memory()
    } else {
        ScenarioStore::open(db)
    }
}

fn parse_command(line: &str) -> Result<IpcCommand, serde_json::Value> {
    serde_json::from_str(line).map_err(|e| {
        log::warn!("Unreadable command: {e}");
        serde_json::json!({ "error": e.to_string(), "kind": "bad_request" })
    })
}

fn handle_command(
    repo: &ScenarioRepository,
    cmd: IpcCommand,
    reports_dir: &str,
) -> Result<serde_json::Value, RoiError> {
    let value = match cmd {
        IpcCommand::Simulate { input } => serde_json::to_value(repo.simulate(&input)?)?,
        IpcCommand::CreateScenario(payload) => {
            serde_json::to_value(repo.create(&payload.scenario_name, payload.input)?)?
        }
        IpcCommand::ListScenarios { skip, limit } => serde_json::to_value(repo.list(skip, limit)?)?,
        IpcCommand::GetScenario { scenario_id } => serde_json::to_value(repo.get(scenario_id)?)?,
        IpcCommand::GenerateReport(request) => {
            let path = repo.generate_report(&request, reports_dir)?;
            serde_json::json!({
                "message": "Report generated successfully",
                "file_path": path.display().to_string(),
            })
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn error_response(err: &RoiError) -> serde_json::Value {
    let kind = match err {
        RoiError::Validation { .. } => "validation",
        RoiError::ScenarioNotFound { .. } => "not_found",
        _ => "internal",
    };
    if !err.is_client_error() {
        log::error!("Command failed: {err}");
    }
    serde_json::json!({ "error": err.to_string(), "kind": kind })
}

fn print_summary(input: &SimulationInput, output: &SimulationOutput) {
    let na = || "N/A".to_string();

    println!("=== SIMULATION SUMMARY ===");
    println!("  invoices/month:      {}", input.monthly_invoice_volume);
    println!("  horizon:             {} months", input.time_horizon_months);
    println!("  implementation cost: ${:.2}", input.one_time_implementation_cost);
    println!("  monthly savings:     ${:.2}", output.monthly_savings);
    println!("  cumulative savings:  ${:.2}", output.cumulative_savings);
    println!("  net savings:         ${:.2}", output.net_savings);
    println!(
        "  payback:             {}",
        output.payback_months.map(|m| format!("{m:.2} months")).unwrap_or_else(na)
    );
    println!(
        "  ROI:                 {}",
        output.roi_percentage.map(|r| format!("{r:.2}%")).unwrap_or_else(na)
    );
}

fn string_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo() -> ScenarioRepository {
        let _ = env_logger::builder().is_test(true).try_init();
        ScenarioRepository::new(open_store(IN_MEMORY_DB).unwrap(), Calculator::default()).unwrap()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn reference_fields() -> serde_json::Value {
        json!({
            "monthly_invoice_volume": 1000,
            "num_ap_staff": 2,
            "avg_hours_per_invoice": 0.5,
            "hourly_wage": 20.0,
            "error_rate_manual": 3.0,
            "error_cost": 50.0,
            "time_horizon_months": 12,
            "one_time_implementation_cost": 5000.0
        })
    }

    fn command(value: serde_json::Value) -> IpcCommand {
        parse_command(&value.to_string()).unwrap()
    }

    #[test]
    fn defaults_use_a_private_in_memory_database() {
        let config = RunnerConfig::from_args(&args(&["roi-runner", "--ipc-mode"]));
        assert_eq!(config.db, IN_MEMORY_DB);
        assert_eq!(config.reports_dir, "reports");
        assert!(config.ipc_mode);

        // Each open is its own database.
        let first = repo();
        let input: SimulationInput = serde_json::from_value(reference_fields()).unwrap();
        first.create("Only here", input).unwrap();
        assert_eq!(first.count().unwrap(), 1);
        assert_eq!(repo().count().unwrap(), 0);
    }

    #[test]
    fn flags_override_defaults() {
        let config = RunnerConfig::from_args(&args(&[
            "roi-runner", "--db", "file:runs.db", "--reports-dir", "out", "--name", "Q3",
        ]));
        assert_eq!(config.db, "file:runs.db");
        assert_eq!(config.reports_dir, "out");
        assert_eq!(config.name.as_deref(), Some("Q3"));
        assert!(!config.ipc_mode);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn error_kinds() {
        let validation = RoiError::validation("hourly_wage", "must be > 0, got -1");
        assert_eq!(error_response(&validation)["kind"], "validation");
        assert_eq!(error_response(&validation)["error"], "Invalid hourly_wage: must be > 0, got -1");

        let missing = RoiError::ScenarioNotFound { id: 9 };
        assert_eq!(error_response(&missing)["kind"], "not_found");

        let internal = RoiError::Other(anyhow::anyhow!("disk on fire"));
        assert_eq!(error_response(&internal)["kind"], "internal");
        assert_eq!(error_response(&internal)["error"], "disk on fire");

        let bad = parse_command(r#"{"type": "launch_rockets"}"#).unwrap_err();
        assert_eq!(bad["kind"], "bad_request");
        assert!(parse_command("not json").is_err());
    }

    #[test]
    fn commands_read_their_payloads() {
        let mut create = reference_fields();
        create["type"] = json!("create_scenario");
        create["scenario_name"] = json!("Q3 pilot");
        match command(create) {
            IpcCommand::CreateScenario(payload) => {
                assert_eq!(payload.scenario_name, "Q3 pilot");
                assert_eq!(payload.input.time_horizon_months, 12);
            }
            other => panic!("expected create_scenario, got {other:?}"),
        }

        match command(json!({ "type": "list_scenarios" })) {
            IpcCommand::ListScenarios { skip, limit } => {
                assert_eq!(skip, 0);
                assert_eq!(limit, DEFAULT_PAGE_LIMIT);
            }
            other => panic!("expected list_scenarios, got {other:?}"),
        }
        assert!(matches!(command(json!({ "type": "quit" })), IpcCommand::Quit));
    }

    #[test]
    fn handle_command_round_trip() {
        let repo = repo();
        let dir = std::env::temp_dir().join(format!("roi-runner-{}", std::process::id()));
        let dir = dir.to_str().unwrap().to_string();

        let simulated = handle_command(
            &repo,
            command(json!({ "type": "simulate", "input": reference_fields() })),
            &dir,
        )
        .unwrap();
        assert_eq!(simulated["monthly_savings"], 23375.0);
        assert_eq!(repo.count().unwrap(), 0);

        let mut create = reference_fields();
        create["type"] = json!("create_scenario");
        create["scenario_name"] = json!("Q3 pilot");
        let created = handle_command(&repo, command(create), &dir).unwrap();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["scenario_name"], "Q3 pilot");
        assert_eq!(created["roi_percentage"], 5510.0);

        let fetched = handle_command(
            &repo,
            command(json!({ "type": "get_scenario", "scenario_id": id })),
            &dir,
        )
        .unwrap();
        assert_eq!(fetched, created);

        let listed = handle_command(&repo, command(json!({ "type": "list_scenarios" })), &dir).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let report = handle_command(
            &repo,
            command(json!({ "type": "generate_report", "scenario_id": id, "email": "cfo@example.com" })),
            &dir,
        )
        .unwrap();
        assert_eq!(report["message"], "Report generated successfully");
        assert!(report["file_path"].as_str().unwrap().ends_with(&format!("Q3 pilot_{id}.pdf")));
        let _ = std::fs::remove_dir_all(&dir);

        let err = handle_command(
            &repo,
            command(json!({ "type": "get_scenario", "scenario_id": id + 1 })),
            &dir,
        )
        .unwrap_err();
        assert_eq!(error_response(&err)["kind"], "not_found");

        let mut bad = reference_fields();
        bad["hourly_wage"] = json!(0.0);
        let err = handle_command(&repo, command(json!({ "type": "simulate", "input": bad })), &dir)
            .unwrap_err();
        assert_eq!(error_response(&err)["kind"], "validation");
    }
}
