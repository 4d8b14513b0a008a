use tracing_subscriber::EnvFilter;

use crate::{LogFormat, LogLevel};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the filter comes from `LOG_LEVEL`.
pub fn init(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
