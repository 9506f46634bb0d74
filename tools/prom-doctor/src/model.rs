//! Query API documents and the records derived from them.
//!
//! Every field is optional on the wire; missing values decode to defaults so
//! a sparse response is still classified instead of rejected.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const STATUS_SUCCESS: &str = "success";
pub const UNKNOWN: &str = "unknown";

/// `{status, data}` envelope shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiResponse<T: Default> {
    pub status: String,
    pub data: T,
}

impl<T: Default> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeInfo {
    pub version: Option<String>,
    pub start_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetsData {
    pub active_targets: Vec<ActiveTarget>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActiveTarget {
    pub labels: BTreeMap<String, String>,
    pub health: Option<String>,
    pub last_scrape: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryData {
    pub result: Vec<Sample>,
}

/// One instant-vector series: labels plus `[timestamp, "value"]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sample {
    pub metric: BTreeMap<String, String>,
    pub value: Vec<Value>,
}

impl Sample {
    /// The sample value as reported, `?` when absent.
    pub fn value_text(&self) -> String {
        match self.value.get(1) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "?".to_string(),
        }
    }

    pub fn label(&self, name: &str) -> &str {
        self.metric.get(name).map(String::as_str).unwrap_or(UNKNOWN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetHealth {
    Up,
    Down,
    Unknown,
}

impl From<Option<&str>> for TargetHealth {
    fn from(raw: Option<&str>) -> Self {
        match raw {
            Some("up") => TargetHealth::Up,
            Some("down") => TargetHealth::Down,
            _ => TargetHealth::Unknown,
        }
    }
}

impl fmt::Display for TargetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetHealth::Up => "up",
            TargetHealth::Down => "down",
            TargetHealth::Unknown => UNKNOWN,
        };
        write!(f, "{}", s)
    }
}

/// Scrape target as reported by `/api/v1/targets`.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetHealthRecord {
    pub job: String,
    pub instance: String,
    pub health: TargetHealth,
    pub last_scrape: String,
    /// Empty when the last scrape succeeded.
    pub last_error: String,
}

impl From<&ActiveTarget> for TargetHealthRecord {
    fn from(target: &ActiveTarget) -> Self {
        let label = |name: &str| {
            target
                .labels
                .get(name)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        Self {
            job: label("job"),
            instance: label("instance"),
            health: TargetHealth::from(target.health.as_deref()),
            last_scrape: target
                .last_scrape
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            last_error: target.last_error.clone().unwrap_or_default(),
        }
    }
}

/// Presence of one metric name in an instant query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPresenceRecord {
    pub metric: String,
    pub series_count: usize,
    /// Labels and raw value of the first series.
    pub example: Option<(BTreeMap<String, String>, Vec<Value>)>,
}

impl MetricPresenceRecord {
    pub fn from_samples(metric: &str, samples: &[Sample]) -> Self {
        Self {
            metric: metric.to_string(),
            series_count: samples.len(),
            example: samples
                .first()
                .map(|s| (s.metric.clone(), s.value.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_runtime_info_decodes() {
        let doc = json!({"status": "success", "data": {"version": "2.40.0", "startTime": "t0"}});
        let resp: ApiResponse<RuntimeInfo> = serde_json::from_value(doc).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.data.version.as_deref(), Some("2.40.0"));
        assert_eq!(resp.data.start_time.as_deref(), Some("t0"));
    }

    #[test]
    fn test_missing_fields_default() {
        let resp: ApiResponse<TargetsData> = serde_json::from_value(json!({})).unwrap();
        assert!(!resp.is_success());
        assert!(resp.data.active_targets.is_empty());
    }

    #[test]
    fn test_target_record_defaults() {
        let target: ActiveTarget = serde_json::from_value(json!({
            "labels": {"job": "market-data"},
            "health": "sideways"
        }))
        .unwrap();
        let record = TargetHealthRecord::from(&target);
        assert_eq!(record.job, "market-data");
        assert_eq!(record.instance, "unknown");
        assert_eq!(record.health, TargetHealth::Unknown);
        assert_eq!(record.last_scrape, "unknown");
        assert_eq!(record.last_error, "");
    }

    #[test]
    fn test_sample_value_text() {
        let sample: Sample = serde_json::from_value(json!({
            "metric": {"instance": "md:7001"},
            "value": [1700000000.123, "1"]
        }))
        .unwrap();
        assert_eq!(sample.value_text(), "1");
        assert_eq!(sample.label("instance"), "md:7001");
        assert_eq!(sample.label("job"), "unknown");

        let numeric: Sample = serde_json::from_value(json!({"value": [0, 1]})).unwrap();
        assert_eq!(numeric.value_text(), "1");

        let empty = Sample::default();
        assert_eq!(empty.value_text(), "?");
    }
}
