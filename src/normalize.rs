//! Converts raw archiver samples into plot-ready timestamp/value vectors.

use chrono::{DateTime, Local};

use crate::types::{RawSample, TimeRange};

/// The appliance encodes "no usable value" as ±infinity in some archived
/// streams; plotting layers expect NaN gaps instead.
pub fn scrub_infinite(value: f64) -> f64 {
    if value.is_infinite() {
        f64::NAN
    } else {
        value
    }
}

/// Normalizes raw samples against the originally requested range.
///
/// Returns `None` when nothing usable remains, which callers treat as the
/// no-data outcome. Two edge rules apply when a range was requested:
///
/// - point lookup (`start == end`): only the latest sample at or before the
///   requested instant is kept;
/// - window query: a first sample lying before the window start is the
///   fill value carried in from before the window and is dropped.
pub fn normalize(
    samples: &[RawSample],
    range: Option<&TimeRange>,
) -> Option<(Vec<DateTime<Local>>, Vec<f64>)> {
    let mut timestamps = Vec::with_capacity(samples.len());
    let mut values = Vec::with_capacity(samples.len());

    for sample in samples {
        let (Some(ts), Some(val)) = (sample.timestamp(), sample.value_as_f64()) else {
            continue;
        };
        timestamps.push(ts);
        values.push(scrub_infinite(val));
    }

    if timestamps.is_empty() {
        return None;
    }

    match range {
        Some(range) if range.is_point() => {
            let idx = timestamps.iter().rposition(|ts| *ts <= range.start)?;
            Some((vec![timestamps[idx]], vec![values[idx]]))
        }
        Some(range) if timestamps.len() > 1 && timestamps[0] < range.start => {
            timestamps.remove(0);
            values.remove(0);
            Some((timestamps, values))
        }
        _ => Some((timestamps, values)),
    }
}
