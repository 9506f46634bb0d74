use clap::Parser;
use prom_doctor::audit::{self, Checks};
use prom_doctor::client::HttpPromApi;
use prom_doctor::config::Config;
use prom_doctor::error::AuditError;
use prom_doctor::report::Report;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs on stderr, report on stdout
    telemetry::logging::init_tracing();
    let config = Config::parse();

    let api = match HttpPromApi::new(&config.prom_url, config.timeout()) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let checks = Checks {
        jobs: config.jobs,
        metrics: config.metrics,
        expected_targets: config.expected_targets,
    };
    let mut report = Report::new(std::io::stdout().lock());
    if let Err(AuditError::Io(e)) = audit::run(&api, &checks, &mut report).await {
        tracing::error!(error = %e, "Audit aborted");
        return ExitCode::FAILURE;
    }

    // Only a fatal finding fails the run
    if report.has_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
