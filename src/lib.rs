//! chart-spec-rs: chart specification preparation and live instance management.
//!
//! Raw records and field mappings are normalized into series, aligned onto a
//! shared x-domain and assembled into renderer-ready specifications. A host
//! then drives one engine instance per drawing surface: fingerprint-gated
//! applies, debounced resizes and click disambiguation for legend and series
//! interaction.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod spec;
pub mod telemetry;

pub use api::{ChartHost, HostConfig, InstanceHandle, InstanceManager};
pub use error::{ChartError, ChartResult};
