//! Query construction for the retrieval service.
//!
//! A [`PvQuery`] is the validated set of `getData.json` parameters for one
//! PV: the operator-wrapped expression plus the formatted time bounds.

use chrono::{DateTime, Duration, Local, SecondsFormat};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ArchiverError, Result};
use crate::operator::Operator;
use crate::types::TimeRange;

static PV_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-:\.]+$").expect("Failed to compile PV name regex"));

pub fn validate_pv_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ArchiverError::InvalidInput {
            message: "PV name cannot be empty".into(),
        });
    }
    if !PV_NAME_REGEX.is_match(name) {
        return Err(ArchiverError::InvalidInput {
            message: format!("PV name contains invalid characters: {name}"),
        });
    }
    Ok(())
}

/// Formats an instant the way the retrieval service expects: ISO 8601 at
/// seconds precision with the local UTC offset.
pub fn format_archiver_time(instant: &DateTime<Local>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvQuery {
    /// Operator-wrapped PV expression, e.g. `lastFill_900(HL1:BCM:M01:BeamCharge)`.
    pub expression: String,
    pub from: Option<String>,
    pub to: Option<String>,
    /// The range as requested by the caller, before any padding. The
    /// normalizer needs it to trim window edges and resolve point lookups.
    pub range: Option<TimeRange>,
}

impl PvQuery {
    /// Validates the request and produces the query parameters.
    ///
    /// The appliance requires a window of at least one second; shorter
    /// ranges (including point lookups) are demoted to an un-binned bare-PV
    /// request padded by one second on each side. The estimated sample count
    /// for the window must stay under `max_samples`.
    pub fn build(
        name: &str,
        operator: Operator,
        bin_seconds: Option<u32>,
        range: Option<&TimeRange>,
        max_samples: u32,
    ) -> Result<Self> {
        validate_pv_name(name)?;
        let bin = bin_seconds.filter(|bin| *bin > 0);

        let Some(range) = range else {
            return Ok(Self {
                expression: operator.expression(name, bin),
                from: None,
                to: None,
                range: None,
            });
        };

        if range.end < range.start {
            return Err(ArchiverError::InvalidTimeRange {
                start: range.start,
                end: range.end,
            });
        }

        let (expression, from, to) = if range.duration() < Duration::seconds(1) {
            (
                name.to_string(),
                range.start - Duration::seconds(1),
                range.end + Duration::seconds(1),
            )
        } else {
            (operator.expression(name, bin), range.start, range.end)
        };

        let window_seconds = (to - from).num_seconds();
        let estimated = match bin {
            Some(bin) => window_seconds / i64::from(bin),
            None => window_seconds,
        };
        if estimated > i64::from(max_samples) {
            return Err(ArchiverError::SampleLimitExceeded {
                requested: estimated,
                limit: max_samples,
            });
        }

        Ok(Self {
            expression,
            from: Some(format_archiver_time(&from)),
            to: Some(format_archiver_time(&to)),
            range: Some(*range),
        })
    }
}
