use clap::Parser;
use looking_glass_domain::CliOverrides;
use looking_glass_infrastructure::LookingGlass;
use tracing::info;

mod bootstrap;
mod server;

#[derive(Parser)]
#[command(name = "looking-glass")]
#[command(version = "0.1.0")]
#[command(about = "DNS looking glass - executes raw DNS queries on behalf of a remote controller")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Controller to dial (host:port) instead of serving stdin/stdout
    #[arg(long, value_name = "HOST:PORT")]
    connect: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        connect: cli.connect.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting DNS looking glass v{}", env!("CARGO_PKG_VERSION"));

    let looking_glass = LookingGlass::with_transport();
    server::run(&config.server, &looking_glass).await?;

    info!("Looking glass shutdown complete");
    Ok(())
}
