//! Wires `Config`'s effective log level into a `tracing-subscriber`
//! formatter. A build tool driving this CLI in-process would instead
//! install its own subscriber; this one is only for the standalone binary.

use fakegen_core::telemetry::LogLevel;

pub fn init(level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.tracing_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
