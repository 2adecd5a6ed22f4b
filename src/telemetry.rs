//! Telemetry helpers for applications embedding `chart-spec-rs`.
//!
//! Normalization warnings, skipped applies and swallowed resize failures are
//! reported through `tracing`. Hosts either call one of these helpers or wire
//! their own subscriber.

/// Installs a compact `tracing` subscriber filtered by `RUST_LOG`, falling back
/// to `default_directive` (for example `"chart_spec=debug"`).
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed.
#[must_use]
pub fn init_tracing(default_directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = default_directive;
        false
    }
}

/// Same as [`init_tracing`] with an `info` default.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing("info")
}
