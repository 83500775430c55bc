//! HTTP client for the EPICS Archiver Appliance management and retrieval
//! services.

use std::collections::HashMap;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ArchiverConfig, DEFAULT_SEARCH_LIMIT};
use crate::error::{ArchiverError, Result};
use crate::normalize::normalize;
use crate::operator::Operator;
use crate::query::PvQuery;
use crate::types::{BatchResult, PvData, PvSpec, PvStatusRecord, Series, TimeRange};

pub struct ArchiverClient {
    client: Client,
    config: ArchiverConfig,
}

impl ArchiverClient {
    /// Creates a client bound to the configured appliance endpoints.
    pub fn new(config: ArchiverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ArchiverError::transport)?;
        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(ArchiverConfig::default())
    }

    pub fn config(&self) -> &ArchiverConfig {
        &self.config
    }

    /// Builds a management service URL with proper query encoding.
    fn mgmt_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.config.mgmt_url, endpoint))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    /// Builds the retrieval URL for a prepared query.
    fn data_url(&self, query: &PvQuery) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/getData.json", self.config.data_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pv", &query.expression);
            if let Some(from) = &query.from {
                pairs.append_pair("from", from);
            }
            if let Some(to) = &query.to {
                pairs.append_pair("to", to);
            }
        }
        Ok(url)
    }

    /// Issues a GET and returns the response body. Transport failures and
    /// non-2xx statuses are errors; the body is not interpreted here so
    /// callers can decide how to treat malformed payloads.
    async fn get_text(&self, url: Url) -> Result<String> {
        debug!(url = %url, "archiver request");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(ArchiverError::transport)?;

        if !response.status().is_success() {
            return Err(ArchiverError::Server {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(ArchiverError::transport)
    }

    /// Searches archived PV names by glob pattern via `getAllPVs`.
    pub async fn search_pvs(&self, pattern: &str, limit: Option<usize>) -> Result<Vec<String>> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).to_string();
        let url = self.mgmt_url("getAllPVs", &[("pv", pattern), ("limit", &limit)])?;
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Queries archival status for every PV in `pvs` and returns a parallel
    /// boolean vector: `true` means the PV is being archived.
    ///
    /// A transport failure fails the call; there is no partial status. A
    /// malformed response instead reports every PV as unarchived, since
    /// downstream treats `false` as "skip this PV".
    pub async fn check_status(&self, pvs: &[String]) -> Result<Vec<bool>> {
        let joined = pvs.join(",");
        let url = self.mgmt_url("getPVStatus", &[("pv", joined.as_str())])?;
        let body = self.get_text(url).await?;

        let records: Vec<PvStatusRecord> = match serde_json::from_str(&body) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "unparseable getPVStatus response, reporting all PVs unarchived");
                return Ok(vec![false; pvs.len()]);
            }
        };

        let archived: HashMap<&str, bool> = records
            .iter()
            .map(|record| (record.pv_name.as_str(), record.is_archived()))
            .collect();

        Ok(pvs
            .iter()
            .map(|pv| archived.get(pv.as_str()).copied().unwrap_or(false))
            .collect())
    }

    /// Resolves the effective operator and bin width for a spec against the
    /// configured defaults. A zero bin width disables binning.
    fn resolve(&self, spec: &PvSpec) -> (Operator, Option<u32>) {
        let operator = spec.operator.unwrap_or(self.config.default_operator);
        let bin = match spec.bin_seconds.unwrap_or(self.config.default_bin_seconds) {
            0 => None,
            bin => Some(bin),
        };
        (operator, bin)
    }

    /// Fetches and normalizes one PV.
    ///
    /// `Ok(None)` means the server had no data for the PV in the window, a
    /// normal outcome. Errors cover caller mistakes (bad name, reversed
    /// range, sample cap) and transport or parse failures.
    pub async fn fetch_series(
        &self,
        spec: &PvSpec,
        range: Option<&TimeRange>,
    ) -> Result<Option<Series>> {
        let (operator, bin) = self.resolve(spec);
        let query = PvQuery::build(&spec.name, operator, bin, range, self.config.max_samples)?;

        // Brief pause so batches do not overwhelm the appliance.
        tokio::time::sleep(self.config.fetch_pause).await;

        let url = self.data_url(&query)?;
        let body = self.get_text(url).await?;
        let envelopes: Vec<PvData> = serde_json::from_str(&body)?;

        let Some(envelope) = envelopes.into_iter().next() else {
            info!(pv = %spec.name, "empty response envelope");
            return Ok(None);
        };

        let unit = spec.unit.clone().or(envelope.meta.egu);

        match normalize(&envelope.data, query.range.as_ref()) {
            Some((timestamps, values)) => Ok(Some(Series::new(
                envelope.meta.name,
                operator,
                unit,
                timestamps,
                values,
            ))),
            None => {
                info!(pv = %spec.name, "no data in requested window");
                Ok(None)
            }
        }
    }

    /// Fetches a batch of PVs sequentially, in input order.
    ///
    /// Each PV degrades independently: an unarchived PV, a failed fetch, or
    /// an empty window all yield a no-data sentinel in that PV's slot, so
    /// the result always has one entry per requested PV. Only two things
    /// fail the batch as a whole: an unusable status response (no per-PV
    /// decision can be made without it) and range-level caller mistakes,
    /// which would fail every PV identically.
    ///
    /// A single-PV request collapses to the bare series.
    pub async fn fetch_batch(
        &self,
        specs: &[PvSpec],
        range: Option<&TimeRange>,
    ) -> Result<BatchResult> {
        if specs.is_empty() {
            return Err(ArchiverError::EmptyBatch);
        }

        let names: Vec<String> = specs.iter().map(|spec| spec.name.clone()).collect();
        let statuses = self.check_status(&names).await?;

        let mut results = Vec::with_capacity(specs.len());
        for (spec, archived) in specs.iter().zip(statuses) {
            let (operator, _) = self.resolve(spec);

            if !archived {
                warn!(pv = %spec.name, "PV is not being archived");
                results.push(Series::no_data(&spec.name, operator, spec.unit.clone()));
                continue;
            }

            match self.fetch_series(spec, range).await {
                Ok(Some(series)) => results.push(series),
                Ok(None) => {
                    results.push(Series::no_data(&spec.name, operator, spec.unit.clone()));
                }
                Err(err) if err.aborts_batch() => return Err(err),
                Err(err) => {
                    warn!(pv = %spec.name, error = %err, "fetch failed, emitting no-data entry");
                    results.push(Series::no_data(&spec.name, operator, spec.unit.clone()));
                }
            }
        }

        if results.len() == 1 {
            match results.pop() {
                Some(series) => Ok(BatchResult::Single(series)),
                None => Err(ArchiverError::EmptyBatch),
            }
        } else {
            Ok(BatchResult::Many(results))
        }
    }
}
