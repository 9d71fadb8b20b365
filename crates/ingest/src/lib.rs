//! Hive Reading Ingestion
//!
//! Wires validation, health evaluation, storage, and notification gating
//! into a single pipeline, plus the account and content service, and the
//! configuration and logging setup used by the `hive-ingest` binary.

mod config;
mod logging;
mod pipeline;
mod portal;
mod seed;

pub use crate::config::{AuthConfig, IngestConfig, LoggingConfig, MarketPrices};
pub use logging::init_logging;
pub use pipeline::{DeviceReading, IngestError, IngestOutcome, Ingestor};
pub use portal::Portal;
pub use seed::{seed_hives, SeedHive};
