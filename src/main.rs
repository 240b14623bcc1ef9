use anyhow::Result;
use avm_mcp_server::config::{Cli, Config, load_dotenv};
use avm_mcp_server::server::transport;
use clap::Parser;

#[cfg(feature = "trace")]
use tracing_subscriber::EnvFilter;

/// You can inspect the server using the Model Context Protocol Inspector.
/// npx @modelcontextprotocol/inspector cargo run -- --transport stdio
#[tokio::main]
async fn main() -> Result<()> {
    // `.env` first so its values can back the command line flags
    let dotenv = load_dotenv();
    let config = Config::from_cli(Cli::parse())?;

    #[cfg(feature = "trace")]
    init_tracing(&config)?;

    tracing::info!("Starting AVM MCP server");
    if let Some(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let server = avm_mcp_server::build_server(&config)?;
    transport::serve(server, &config).await
}

/// Logs go to stderr or a file, never stdout, which carries the stdio transport
#[cfg(feature = "trace")]
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.effective_log_level().into());

    match &config.log_file {
        Some(path) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::fs::File::create(path)?)
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    Ok(())
}
