use crate::config::Config;

/// Install the global subscriber.
///
/// Log lines go to stderr. `RUST_LOG` takes precedence over `default_filter`.
/// Returns `false` when a subscriber was already installed, in which case
/// nothing changes.
pub fn init_tracing(default_filter: &str) -> bool {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(target: "system", "Tracing initialized with filter '{}'", default_filter);
    }
    installed
}

/// Install the global subscriber using the `[logging]` table of `config`
pub fn init_from_config(config: &Config) -> bool {
    init_tracing(&config.logging.filter)
}
