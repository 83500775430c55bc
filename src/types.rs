use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::operator::Operator;

/// Response envelope metadata returned with every `getData.json` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub name: String,
    #[serde(alias = "EGU", default)]
    pub egu: Option<String>,
    #[serde(alias = "DESC", default)]
    pub description: Option<String>,
    #[serde(alias = "PREC", default)]
    pub precision: Option<String>,
}

/// A single archived sample as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    pub secs: i64,
    #[serde(default)]
    pub nanos: i64,
    pub val: SampleValue,
    pub severity: Option<i32>,
    pub status: Option<i32>,
}

/// Sample payloads vary by PV type: scalars for most diagnostics, arrays for
/// waveform records, strings for enumerated or text PVs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Scalar(f64),
    Array(Vec<f64>),
    Text(String),
}

impl RawSample {
    /// Extracts the sample value as an f64 if possible. Waveform samples
    /// contribute their first element.
    pub fn value_as_f64(&self) -> Option<f64> {
        match &self.val {
            SampleValue::Scalar(v) => Some(*v),
            SampleValue::Array(arr) if !arr.is_empty() => Some(arr[0]),
            _ => None,
        }
    }

    /// Converts the epoch seconds + nanoseconds pair to a local-time instant.
    pub fn timestamp(&self) -> Option<DateTime<Local>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        Local.timestamp_opt(self.secs, nanos).single()
    }
}

/// Per-PV envelope of a `getData.json` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvData {
    pub meta: Meta,
    #[serde(default)]
    pub data: Vec<RawSample>,
}

/// One entry of a `getPVStatus` response. The endpoint returns more fields
/// than these; only the archival state matters here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvStatusRecord {
    #[serde(alias = "pvName")]
    pub pv_name: String,
    pub status: String,
}

impl PvStatusRecord {
    pub fn is_archived(&self) -> bool {
        self.status == "Being archived"
    }
}

/// Closed time interval for a data request. `start == end` degenerates to a
/// point lookup ("value as of time T").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeRange {
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    /// A point-in-time lookup rather than a window.
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// One requested PV with optional per-PV overrides. Fields left unset fall
/// back to the [`crate::ArchiverConfig`] defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvSpec {
    pub name: String,
    pub operator: Option<Operator>,
    /// Bin width override in seconds. `Some(0)` requests an unbinned
    /// operator expression.
    pub bin_seconds: Option<u32>,
    /// Engineering unit override. When unset, the unit reported by the
    /// server metadata is used.
    pub unit: Option<String>,
}

impl PvSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: None,
            bin_seconds: None,
            unit: None,
        }
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_bin_seconds(mut self, bin_seconds: u32) -> Self {
        self.bin_seconds = Some(bin_seconds);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// A normalized time series for one PV.
///
/// `timestamps` and `values` are parallel vectors of equal length. Both set
/// to `None` is the no-data sentinel: the PV was unarchived, the window was
/// empty, or the fetch failed. That state is expected and valid, not an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub operator: Operator,
    pub unit: Option<String>,
    pub timestamps: Option<Vec<DateTime<Local>>>,
    pub values: Option<Vec<f64>>,
}

impl Series {
    pub fn new(
        name: impl Into<String>,
        operator: Operator,
        unit: Option<String>,
        timestamps: Vec<DateTime<Local>>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self {
            name: name.into(),
            operator,
            unit,
            timestamps: Some(timestamps),
            values: Some(values),
        }
    }

    /// The sentinel emitted for a PV that produced nothing.
    pub fn no_data(name: impl Into<String>, operator: Operator, unit: Option<String>) -> Self {
        Self {
            name: name.into(),
            operator,
            unit,
            timestamps: None,
            values: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.timestamps.as_ref().is_some_and(|ts| !ts.is_empty())
    }

    pub fn len(&self) -> usize {
        self.timestamps.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a batch fetch. A request for exactly one PV collapses to the
/// bare series instead of a one-element vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchResult {
    Single(Series),
    Many(Vec<Series>),
}

impl BatchResult {
    pub fn len(&self) -> usize {
        match self {
            BatchResult::Single(_) => 1,
            BatchResult::Many(series) => series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<Series> {
        match self {
            BatchResult::Single(series) => vec![series],
            BatchResult::Many(series) => series,
        }
    }

    pub fn as_slice(&self) -> &[Series] {
        match self {
            BatchResult::Single(series) => std::slice::from_ref(series),
            BatchResult::Many(series) => series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_envelope_deserialization() {
        let body = r#"[{
            "meta": { "name": "HL1:BCM:M01:BeamCharge", "EGU": "nC", "PREC": "3" },
            "data": [
                { "secs": 1700000000, "nanos": 500000000, "val": 1.25, "severity": 0, "status": 0 },
                { "secs": 1700000900, "val": 1.5 }
            ]
        }]"#;

        let envelopes: Vec<PvData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelopes.len(), 1);
        let envelope = &envelopes[0];
        assert_eq!(envelope.meta.name, "HL1:BCM:M01:BeamCharge");
        assert_eq!(envelope.meta.egu.as_deref(), Some("nC"));
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[0].value_as_f64(), Some(1.25));
        // nanos defaults to zero when the server omits it
        assert_eq!(envelope.data[1].nanos, 0);
    }

    #[test]
    fn test_waveform_sample_takes_first_element() {
        let sample: RawSample =
            serde_json::from_str(r#"{ "secs": 1700000000, "nanos": 0, "val": [3.0, 4.0] }"#)
                .unwrap();
        assert_eq!(sample.value_as_f64(), Some(3.0));
    }

    #[test]
    fn test_text_sample_has_no_numeric_value() {
        let sample: RawSample =
            serde_json::from_str(r#"{ "secs": 1700000000, "nanos": 0, "val": "OFF" }"#).unwrap();
        assert_eq!(sample.value_as_f64(), None);
    }

    #[test]
    fn test_sample_timestamp_conversion() {
        let sample = RawSample {
            secs: 1700000000,
            nanos: 250_000_000,
            val: SampleValue::Scalar(0.0),
            severity: None,
            status: None,
        };
        let expected = Local.timestamp_opt(1700000000, 250_000_000).unwrap();
        assert_eq!(sample.timestamp(), Some(expected));
    }

    #[test]
    fn test_status_record_aliases() {
        let record: PvStatusRecord = serde_json::from_str(
            r#"{ "pvName": "HL1:BCM:M01:BeamCharge", "status": "Being archived" }"#,
        )
        .unwrap();
        assert!(record.is_archived());

        let paused: PvStatusRecord =
            serde_json::from_str(r#"{ "pvName": "HL1:X", "status": "Paused" }"#).unwrap();
        assert!(!paused.is_archived());
    }

    #[test]
    fn test_no_data_sentinel() {
        let series = Series::no_data("HL1:X", Operator::LastFill, Some("mA".into()));
        assert!(!series.has_data());
        assert_eq!(series.len(), 0);
        assert_eq!(series.unit.as_deref(), Some("mA"));
    }

    #[test]
    fn test_batch_result_accessors() {
        let single = BatchResult::Single(Series::no_data("A", Operator::Raw, None));
        assert_eq!(single.len(), 1);
        assert_eq!(single.as_slice()[0].name, "A");

        let many = BatchResult::Many(vec![
            Series::no_data("A", Operator::Raw, None),
            Series::no_data("B", Operator::Raw, None),
        ]);
        assert_eq!(many.len(), 2);
        assert_eq!(many.into_vec().len(), 2);
    }
}
