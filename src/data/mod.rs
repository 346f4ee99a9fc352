/// Data layer: the normalization and derived-metrics pipeline.
///
/// Architecture:
/// ```text
///  uploaded .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → select value column → time index → RawSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ validate  │  numeric coercion → CanonicalSeries (NaN markers)
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌──────────┐          ┌──────────┐
///   │ metrics   │          │  filter   │  range views → export
///   └──────────┘          └──────────┘
/// ```
///
/// Fatal conditions (`PipelineError`) abort before any derived component
/// runs; the invalid-time warning and the degenerate-series condition are
/// annotated on the results instead.

pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod validate;

use model::{CanonicalSeries, PipelineError};

/// One full pipeline pass: upload bytes to canonical series.
pub fn run(bytes: &[u8]) -> Result<CanonicalSeries, PipelineError> {
    validate::coerce(loader::ingest(bytes)?)
}
