use tracing_subscriber::EnvFilter;

use usagi_core::config::{LogFormat, LoggingConfig};

/// Installs the global subscriber from config. Safe to call more than
/// once; later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // An already-installed subscriber wins.
    let _ = result;
}
