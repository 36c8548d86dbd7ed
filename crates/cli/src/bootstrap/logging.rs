use looking_glass_domain::{Config, LogFormat};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Output goes to stderr since stdout may
/// carry protocol frames.
///
/// `RUST_LOG` overrides the configured level, e.g.
///   RUST_LOG=looking_glass_infrastructure::dns::transport=trace
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match config.logging.format {
        LogFormat::Json => builder.json().try_init().ok(),
        LogFormat::Text => builder.try_init().ok(),
    };
}
