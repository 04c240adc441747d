// Library root: re-exports every module so integration tests and the
// binary share one surface.

pub mod config;
pub mod ingest;
pub mod model;
pub mod report;
pub mod stats;
pub mod store;
