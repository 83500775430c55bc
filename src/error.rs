// error.rs

use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("invalid time range: end {end} is before start {start}")]
    InvalidTimeRange {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },

    #[error("requested {requested} samples exceeds the server cap of {limit}")]
    SampleLimitExceeded { requested: i64, limit: u32 },

    #[error("unsupported processing operator: {operator}")]
    UnsupportedOperator { operator: String },

    #[error("batch request contains no PVs")]
    EmptyBatch,

    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("server returned {status} for {url}")]
    Server { status: u16, url: String },

    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl ArchiverError {
    pub(crate) fn transport(source: reqwest::Error) -> Self {
        Self::Transport {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Returns true if the error came from the network layer rather than the
    /// request or the response contents.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Server { .. })
    }

    /// Returns true if the error invalidates the whole batch rather than a
    /// single PV. The time range and sample cap are shared by every PV in a
    /// batch, so failing one of those checks means every fetch would fail.
    pub fn aborts_batch(&self) -> bool {
        matches!(
            self,
            Self::InvalidTimeRange { .. } | Self::SampleLimitExceeded { .. } | Self::EmptyBatch
        )
    }
}

/// Result type alias for ArchiverError
pub type Result<T> = std::result::Result<T, ArchiverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_limit_carries_diagnostics() {
        let err = ArchiverError::SampleLimitExceeded {
            requested: 86400,
            limit: 10000,
        };
        assert!(err.to_string().contains("86400"));
        assert!(err.to_string().contains("10000"));
        assert!(err.aborts_batch());
    }

    #[test]
    fn test_unsupported_operator_is_per_pv() {
        let err = ArchiverError::UnsupportedOperator {
            operator: "avg".to_string(),
        };
        assert!(!err.aborts_batch());
        assert!(!err.is_transport());
    }
}
