mod chart_host;
mod host_config;
mod instance_manager;

pub use chart_host::{ChartHost, TimerReport};
pub use host_config::HostConfig;
pub use instance_manager::{ApplyOutcome, InstanceHandle, InstanceManager, LifecycleState};
