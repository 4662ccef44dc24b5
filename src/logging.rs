//! Console logging through `tracing`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info";

/// Builds the filter used when `RUST_LOG` is unset. An unparseable filter
/// string falls back to `info`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Returns false if one was already set,
/// e.g. when called twice from the same process.
pub fn init(default_filter: &str) -> bool {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(console_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_strings() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = format!("{}", env_filter("warn,dark_side::scene=debug"));
        assert!(filter.contains("warn"));
        assert!(filter.contains("dark_side::scene=debug"));
    }
}
