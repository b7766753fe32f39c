use std::process::ExitCode;

use hr_dashboard::{DashboardConfig, DashboardReport, EmployeeTable, ProcessorError, logging};
use tracing::{error, info};

/// Loads the configured dataset and prints the dashboard report as JSON.
///
/// Usage: `hr-dashboard [config.toml]`
fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(path) => match DashboardConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => DashboardConfig::default(),
    };
    logging::init(&config.logging);

    match run(&config) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, data_file = %config.data_file.display(), "dashboard run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &DashboardConfig) -> Result<String, ProcessorError> {
    let table = EmployeeTable::load_csv(&config.data_file, &config.fill)?;
    let report = DashboardReport::build(&table, config);
    info!(
        employees = report.gender.total,
        departments = report.departments.len(),
        "report built"
    );
    serde_json::to_string_pretty(&report).map_err(|e| ProcessorError::DataFormat(e.to_string()))
}
