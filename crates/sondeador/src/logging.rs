//! Log subscriber installation

use crate::config::CliConfig;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber on stderr.
///
/// `RUST_LOG` wins over the verbosity flags. Calling this twice keeps the
/// first subscriber.
pub fn init_logging(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}
