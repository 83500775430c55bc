// config.rs

use std::time::Duration;

use crate::operator::Operator;

/// Default appliance host. The management and retrieval services listen on
/// separate ports of the same machine.
pub const DEFAULT_HOST: &str = "http://xfel-archive.postech.ac.kr";
pub const MGMT_PORT: u16 = 17665;
pub const RETRIEVAL_PORT: u16 = 17668;

pub const DEFAULT_BIN_SECONDS: u32 = 900;
pub const DEFAULT_MAX_SAMPLES: u32 = 10_000;
pub const DEFAULT_SEARCH_LIMIT: usize = 500;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause inserted before every data request so a batch of PVs does not
/// hammer the appliance.
pub const FETCH_PAUSE: Duration = Duration::from_millis(10);

/// Connection settings and request defaults for an [`crate::ArchiverClient`].
///
/// The base URLs carry the service path prefixes, so test doubles or proxies
/// can point both services at the same host and port.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    /// Management service base, e.g. `http://host:17665/mgmt/bpl`.
    pub mgmt_url: String,
    /// Retrieval service base, e.g. `http://host:17668/retrieval/data`.
    pub data_url: String,
    /// Operator applied when a PV spec does not name one.
    pub default_operator: Operator,
    /// Bin width applied when a PV spec does not name one. Zero disables
    /// binning.
    pub default_bin_seconds: u32,
    /// Server-side cap on the number of samples a single request may return.
    pub max_samples: u32,
    pub timeout: Duration,
    pub fetch_pause: Duration,
}

impl ArchiverConfig {
    /// Builds a config for a standard appliance deployment where both
    /// services run on `host` under the default ports.
    pub fn for_host(host: &str) -> Self {
        Self {
            mgmt_url: format!("{}:{}/mgmt/bpl", host, MGMT_PORT),
            data_url: format!("{}:{}/retrieval/data", host, RETRIEVAL_PORT),
            ..Default::default()
        }
    }
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            mgmt_url: format!("{}:{}/mgmt/bpl", DEFAULT_HOST, MGMT_PORT),
            data_url: format!("{}:{}/retrieval/data", DEFAULT_HOST, RETRIEVAL_PORT),
            default_operator: Operator::LastFill,
            default_bin_seconds: DEFAULT_BIN_SECONDS,
            max_samples: DEFAULT_MAX_SAMPLES,
            timeout: DEFAULT_TIMEOUT,
            fetch_pause: FETCH_PAUSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArchiverConfig::default();
        assert_eq!(config.default_operator, Operator::LastFill);
        assert_eq!(config.default_bin_seconds, 900);
        assert_eq!(config.max_samples, 10_000);
        assert!(config.mgmt_url.ends_with(":17665/mgmt/bpl"));
        assert!(config.data_url.ends_with(":17668/retrieval/data"));
    }

    #[test]
    fn test_for_host() {
        let config = ArchiverConfig::for_host("http://archiver.example.org");
        assert_eq!(
            config.mgmt_url,
            "http://archiver.example.org:17665/mgmt/bpl"
        );
        assert_eq!(
            config.data_url,
            "http://archiver.example.org:17668/retrieval/data"
        );
    }
}
