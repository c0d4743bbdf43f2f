use clap::Parser;
use superlists::{CliArgs, LoggingConfig, ServerConfig, init_logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = ServerConfig::from_args(cli)?;

    run_server(config).await
}
