//! Tracing setup

use crate::config::LoggingConfig;
use crate::devlog::DevLog;
use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

static DEVLOG: OnceLock<DevLog> = OnceLock::new();

/// Install the global subscriber: `EnvFilter`, a `fmt` layer on stderr, and the
/// development log.
///
/// `RUST_LOG` overrides `config.filter`. Only the first call installs anything;
/// later calls return the same [`DevLog`].
pub fn init_tracing(config: &LoggingConfig) -> DevLog {
    DEVLOG
        .get_or_init(|| {
            let devlog = DevLog::new(config.devlog_capacity);
            devlog.set_enabled(config.devlog_enabled);

            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.filter));
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(devlog.layer());

            if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
                // Someone else owns the global subscriber; the log stays empty
                eprintln!("nuvens: tracing already initialized: {e}");
            }
            devlog
        })
        .clone()
}

/// The development log installed by [`init_tracing`], if any
pub fn devlog() -> Option<DevLog> {
    DEVLOG.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_returns_the_same_log() {
        let first = init_tracing(&LoggingConfig::default());
        let second = init_tracing(&LoggingConfig {
            devlog_capacity: 5,
            ..LoggingConfig::default()
        });

        first.clear();
        tracing::info!(target: "nuvens_app::logging", "shared");
        assert_eq!(first.len(), second.len());
        assert!(devlog().is_some());
    }
}
