//! Classification of fetched documents.
//!
//! Pure functions: documents in, report entries out. Nothing here performs
//! I/O, which keeps each step testable with canned responses.

use crate::error::{AuditError, FetchError};
use crate::model::{
    ApiResponse, MetricPresenceRecord, QueryData, RuntimeInfo, Sample, TargetHealthRecord,
    TargetsData, UNKNOWN,
};
use crate::report::{Entry, Level};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a raw document into its typed envelope.
pub fn decode<T>(url: &str, doc: Value) -> Result<ApiResponse<T>, FetchError>
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(doc).map_err(|_| FetchError::Decode {
        url: url.to_string(),
    })
}

/// Reachability: the run continues only on a `success` runtime-info response.
pub fn reachability(
    fetched: Result<ApiResponse<RuntimeInfo>, FetchError>,
) -> Result<Vec<Entry>, AuditError> {
    let info = match fetched {
        Ok(resp) if resp.is_success() => resp.data,
        _ => return Err(AuditError::Unreachable),
    };

    Ok(vec![
        Entry::finding(Level::Ok, "Prometheus reachable."),
        Entry::detail(format!(
            "     Version    : {}",
            info.version.as_deref().unwrap_or(UNKNOWN)
        )),
        Entry::detail(format!(
            "     Start time : {}",
            info.start_time.as_deref().unwrap_or(UNKNOWN)
        )),
    ])
}

/// Active targets. None at all is a warning.
pub fn targets(data: &TargetsData) -> Vec<Entry> {
    if data.active_targets.is_empty() {
        return vec![Entry::finding(
            Level::Warn,
            "No active targets found. Prometheus isn't scraping anything.",
        )];
    }

    let mut entries = Vec::new();
    for target in &data.active_targets {
        let record = TargetHealthRecord::from(target);
        entries.push(Entry::detail(format!(
            "- job={} instance={} health={} lastScrape={}",
            record.job, record.instance, record.health, record.last_scrape
        )));
        if !record.last_error.is_empty() {
            entries.push(Entry::detail(format!("  lastError: {}", record.last_error)));
        }
    }
    entries
}

/// `up{job=...}` series: `"1"` is OK, anything else (or no series) is a warning.
pub fn job_up(job: &str, data: &QueryData) -> Vec<Entry> {
    if data.result.is_empty() {
        return vec![Entry::finding(
            Level::Warn,
            format!("job={job} -> no 'up' series found. Not being scraped or misconfigured target."),
        )];
    }

    data.result
        .iter()
        .map(|sample| {
            let instance = sample.label("instance");
            let value = sample.value_text();
            if value == "1" {
                Entry::finding(
                    Level::Ok,
                    format!("job={job} instance={instance} is UP (up=1)."),
                )
            } else {
                Entry::finding(
                    Level::Warn,
                    format!("job={job} instance={instance} is DOWN (up={value})."),
                )
            }
        })
        .collect()
}

/// Presence of a metric: at least one series is OK.
pub fn metric_presence(metric: &str, samples: &[Sample]) -> Vec<Entry> {
    let record = MetricPresenceRecord::from_samples(metric, samples);

    match &record.example {
        None => vec![Entry::finding(
            Level::Warn,
            format!("Metric `{}` -> no samples found.", record.metric),
        )],
        Some((labels, value)) => vec![
            Entry::finding(
                Level::Ok,
                format!(
                    "Metric `{}` has {} time series.",
                    record.metric, record.series_count
                ),
            ),
            Entry::detail(format!("     Example labels: {}", to_json(labels))),
            Entry::detail(format!("     Example value : {}", to_json(value))),
        ],
    }
}

/// The `up` query for `job`.
pub fn up_query(job: &str) -> String {
    format!("up{{job=\"{job}\"}}")
}

/// Closing advice, printed whatever the findings were.
///
/// `expected_targets` are the addresses Prometheus should be able to reach,
/// whether or not it currently scrapes them.
pub fn summary(expected_targets: &[String]) -> Vec<Entry> {
    let mut entries = vec![
        Entry::detail("If jobs show as [OK] and key metrics have samples, Prometheus is collecting data correctly."),
        Entry::detail("If jobs are missing or metrics have no samples, check:"),
        Entry::detail("- docker-compose.yml: Prometheus service volume mounts and port mapping"),
        Entry::detail("- monitoring/prometheus/prometheus.yml: scrape_configs & target names"),
        Entry::detail("- Service containers: are they up and exposing /metrics on the expected ports?"),
    ];
    let network = if expected_targets.is_empty() {
        "- Docker network: Prometheus can reach its scrape targets".to_string()
    } else {
        format!(
            "- Docker network: Prometheus can reach {}",
            expected_targets
                .iter()
                .map(|t| format!("'{t}'"))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };
    entries.push(Entry::detail(network));
    entries.push(Entry::detail("\nDone."));
    entries
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "?".to_string())
}
