//! Server-side processing operators recognized by the Archiver Appliance.
//!
//! Operators are passed through verbatim in the `pv` query parameter as
//! `operator(PV)` or `operator_bin(PV)`; the appliance does the actual
//! aggregation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArchiverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "raw")]
    Raw,
    #[serde(rename = "firstSample")]
    FirstSample,
    #[serde(rename = "lastSample")]
    LastSample,
    #[serde(rename = "firstFill")]
    FirstFill,
    #[serde(rename = "lastFill")]
    LastFill,
    #[serde(rename = "mean")]
    Mean,
    #[serde(rename = "min")]
    Min,
    #[serde(rename = "max")]
    Max,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "ncount")]
    NCount,
    #[serde(rename = "nth")]
    Nth,
    #[serde(rename = "median")]
    Median,
    #[serde(rename = "std")]
    Std,
    #[serde(rename = "jitter")]
    Jitter,
    #[serde(rename = "ignoreflyers")]
    IgnoreFlyers,
    #[serde(rename = "flyers")]
    Flyers,
    #[serde(rename = "variance")]
    Variance,
    #[serde(rename = "popvariance")]
    PopVariance,
    #[serde(rename = "kurtosis")]
    Kurtosis,
    #[serde(rename = "skewness")]
    Skewness,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Raw => "raw",
            Operator::FirstSample => "firstSample",
            Operator::LastSample => "lastSample",
            Operator::FirstFill => "firstFill",
            Operator::LastFill => "lastFill",
            Operator::Mean => "mean",
            Operator::Min => "min",
            Operator::Max => "max",
            Operator::Count => "count",
            Operator::NCount => "ncount",
            Operator::Nth => "nth",
            Operator::Median => "median",
            Operator::Std => "std",
            Operator::Jitter => "jitter",
            Operator::IgnoreFlyers => "ignoreflyers",
            Operator::Flyers => "flyers",
            Operator::Variance => "variance",
            Operator::PopVariance => "popvariance",
            Operator::Kurtosis => "kurtosis",
            Operator::Skewness => "skewness",
        }
    }

    /// Builds the operator-wrapped PV expression sent in the `pv` parameter.
    /// Raw data is requested with the bare PV name.
    pub fn expression(&self, pv: &str, bin_seconds: Option<u32>) -> String {
        match self {
            Operator::Raw => pv.to_string(),
            op => match bin_seconds {
                Some(bin) => format!("{}_{}({})", op.as_str(), bin, pv),
                None => format!("{}({})", op.as_str(), pv),
            },
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ArchiverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "raw" => Ok(Operator::Raw),
            "firstSample" => Ok(Operator::FirstSample),
            "lastSample" => Ok(Operator::LastSample),
            "firstFill" => Ok(Operator::FirstFill),
            "lastFill" => Ok(Operator::LastFill),
            "mean" => Ok(Operator::Mean),
            "min" => Ok(Operator::Min),
            "max" => Ok(Operator::Max),
            "count" => Ok(Operator::Count),
            "ncount" => Ok(Operator::NCount),
            "nth" => Ok(Operator::Nth),
            "median" => Ok(Operator::Median),
            "std" => Ok(Operator::Std),
            "jitter" => Ok(Operator::Jitter),
            "ignoreflyers" => Ok(Operator::IgnoreFlyers),
            "flyers" => Ok(Operator::Flyers),
            "variance" => Ok(Operator::Variance),
            "popvariance" => Ok(Operator::PopVariance),
            "kurtosis" => Ok(Operator::Kurtosis),
            "skewness" => Ok(Operator::Skewness),
            other => Err(ArchiverError::UnsupportedOperator {
                operator: other.to_string(),
            }),
        }
    }
}
