//! Load generator for the pull-request service.
//!
//! A fixed pool of virtual users repeatedly POSTs uniquely identified
//! pull requests to `{base_url}/pullRequest/create` for a fixed duration.
//! Every response is checked: `201 Created` and `409 Conflict` pass,
//! anything else (including transport failures) fails. Results are
//! aggregated into a [`metrics::RunSummary`].
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod telemetry;
