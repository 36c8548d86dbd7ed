mod logging;

pub use logging::init_logging;

use looking_glass_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    info!(
        connect = config.server.connect.as_deref().unwrap_or("stdio"),
        max_message_bytes = config.server.max_message_bytes,
        "Configuration loaded"
    );
    Ok(config)
}
