//! `tracing` subscriber setup
//!
//! `RUST_LOG` wins over `-v`/`-q` when set. Logs go to stderr so reports on
//! stdout stay machine-readable.

use crate::config::{CliConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the verbosity default
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()))
}

/// Install the global subscriber; a second call is a no-op
pub fn init(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(config.color.should_color()).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = CliConfig::new().with_verbosity(Verbosity::Debug);
        assert!(env_filter(&config).to_string().contains("pwprobe=debug"));
    }

    #[test]
    fn test_init_twice() {
        let config = CliConfig::new().with_log_format(LogFormat::Json);
        init(&config);
        init(&config);
    }
}
