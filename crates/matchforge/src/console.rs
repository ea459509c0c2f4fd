//! Logging bootstrap for applications embedding MatchForge.
//!
//! Library crates only emit `tracing` events; nothing is printed until a
//! subscriber is installed. [`init`] installs one writing to stderr.

use std::sync::OnceLock;

use matchforge_config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the default subscriber with the default logging configuration.
///
/// Safe to call multiple times - only the first call (to this or to
/// [`init_with`]) has effect.
pub fn init() {
    init_with(&LoggingConfig::default());
}

/// Installs the default subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. An invalid directive in
/// the configuration falls back to `matchforge=info`. If another global
/// subscriber is already installed, it is left in place.
pub fn init_with(config: &LoggingConfig) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init();
    });
}

const DEFAULT_FILTER: &str = "matchforge=info";
