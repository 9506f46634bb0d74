//! The audit run.
//!
//! Steps run strictly in order: reachability, active targets, `up` per job,
//! metric presence, summary. Only the first step can end the run early; a
//! failed fetch in any later step is reported and treated as an empty result.

use crate::classify;
use crate::client::{PromApi, QUERY_PATH, RUNTIME_INFO_PATH, TARGETS_PATH};
use crate::error::{AuditError, FetchError};
use crate::model::{QueryData, TargetsData};
use crate::report::{Entry, Level, Report};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::Write;
use tracing::{info, warn};

/// What a run checks.
#[derive(Debug, Clone, Default)]
pub struct Checks {
    /// Jobs whose `up` series are inspected.
    pub jobs: Vec<String>,
    /// Metric names that must have samples.
    pub metrics: Vec<String>,
    /// Addresses named in the summary's network hint.
    pub expected_targets: Vec<String>,
}

/// Run every check against `api`, writing findings to `report`.
///
/// Returns [`AuditError::Unreachable`] after reporting it when the server
/// cannot be reached; no further queries are issued in that case.
pub async fn run<W: Write>(
    api: &dyn PromApi,
    checks: &Checks,
    report: &mut Report<W>,
) -> Result<(), AuditError> {
    report.push(Entry::Section(format!(
        "Prometheus Doctor - Target: {}",
        api.base_url()
    )))?;

    let runtime_url = api.url_for(RUNTIME_INFO_PATH);
    let fetched = api
        .runtime_info()
        .await
        .and_then(|doc| classify::decode(&runtime_url, doc));
    if let Err(e) = &fetched {
        report.push(Entry::finding(Level::Error, e.to_string()))?;
    }
    match classify::reachability(fetched) {
        Ok(entries) => report.extend(entries)?,
        Err(e) => {
            warn!(url = %runtime_url, "Prometheus unreachable");
            report.push(Entry::finding(Level::Fatal, e.to_string()))?;
            return Err(e);
        }
    }

    report.push(Entry::Section("Active Targets".to_string()))?;
    let targets_url = api.url_for(TARGETS_PATH);
    let targets: TargetsData = fetch_data(report, &targets_url, api.targets().await)?;
    report.extend(classify::targets(&targets))?;

    report.push(Entry::Section(
        "Key Jobs Health (using `up` metric)".to_string(),
    ))?;
    let query_url = api.url_for(QUERY_PATH);
    for job in &checks.jobs {
        let expr = classify::up_query(job);
        let data: QueryData = fetch_data(report, &query_url, api.query(&expr).await)?;
        report.extend(classify::job_up(job, &data))?;
    }

    report.push(Entry::Section("Key Metrics Presence".to_string()))?;
    for metric in &checks.metrics {
        let data: QueryData = fetch_data(report, &query_url, api.query(metric).await)?;
        report.extend(classify::metric_presence(metric, &data.result))?;
    }

    report.push(Entry::Section("Summary".to_string()))?;
    report.extend(classify::summary(&checks.expected_targets))?;

    info!(
        warnings = report.findings(Level::Warn).count(),
        errors = report.findings(Level::Error).count(),
        "audit finished"
    );
    Ok(())
}

/// Decode a fetched document, reporting any failure and falling back to an
/// empty result.
fn fetch_data<T, W>(
    report: &mut Report<W>,
    url: &str,
    fetched: Result<Value, FetchError>,
) -> Result<T, AuditError>
where
    T: DeserializeOwned + Default,
    W: Write,
{
    match fetched.and_then(|doc| classify::decode::<T>(url, doc)) {
        Ok(resp) => Ok(resp.data),
        Err(e) => {
            report.push(Entry::finding(Level::Error, e.to_string()))?;
            Ok(T::default())
        }
    }
}
