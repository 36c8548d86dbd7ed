pub mod message_loop;

pub use message_loop::serve;

use looking_glass_domain::ServerConfig;
use looking_glass_infrastructure::LookingGlass;
use tokio::net::TcpStream;
use tracing::info;

/// Serves the controller named in the config, or stdin/stdout when none is.
pub async fn run(config: &ServerConfig, looking_glass: &LookingGlass) -> anyhow::Result<()> {
    match config.connect.as_deref() {
        Some(controller) => {
            let stream = TcpStream::connect(controller).await?;
            info!(controller, local = %stream.local_addr()?, "Connected to controller");
            let (reader, writer) = stream.into_split();
            serve(reader, writer, looking_glass, config.max_message_bytes).await
        }
        None => {
            info!("Serving requests on stdin/stdout");
            serve(
                tokio::io::stdin(),
                tokio::io::stdout(),
                looking_glass,
                config.max_message_bytes,
            )
            .await
        }
    }
}
