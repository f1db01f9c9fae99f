//! Metrics pipeline for building-permission records.
//!
//! `loader` turns a CSV into typed rows, `cache` memoizes loads for one
//! session, and `reports` computes every summary and grouped total the
//! dashboard shows. `output` renders and exports those results.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use cache::DatasetCache;
pub use error::{CorrelationError, DataLoadError, Error, OutputError, Result};
pub use loader::{load, load_from_reader};
pub use reports::{
    by_district, by_mandal, correlation_matrix, districts, filter_by_district, metric_by_mandal,
    sla_by_mandal, sla_compliance, summarize,
};
pub use types::{
    CorrelationMatrix, Dataset, DistrictFilter, GroupTotal, MetricKind, PermitRecord,
    SlaCompliance, SlaPair, Summary,
};
