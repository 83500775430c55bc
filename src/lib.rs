//! Retrieval client for the EPICS Archiver Appliance.
//!
//! Builds operator-wrapped `getData.json` queries, checks archival status,
//! and normalizes the returned epoch-based samples into local-time series
//! suitable for multi-axis plotting. Batches of PVs degrade per PV: a
//! missing or unarchived signal produces a no-data sentinel instead of
//! failing the whole request.

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod operator;
pub mod query;
pub mod types;

pub use client::ArchiverClient;
pub use config::ArchiverConfig;
pub use error::{ArchiverError, Result};
pub use operator::Operator;
pub use query::PvQuery;
pub use types::{BatchResult, Meta, PvData, PvSpec, PvStatusRecord, RawSample, Series, TimeRange};
