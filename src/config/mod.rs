use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;

use crate::github::RAW_CONTENT_BASE;

/// Default container registry hosting the AVM catalog
pub const REGISTRY_BASE: &str = "https://mcr.microsoft.com";

/// Load `KEY=value` pairs from a `.env` file in the working directory or one of its parents.
///
/// Variables already present in the environment keep their value. Returns the loaded file.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

pub fn load_dotenv_from(path: &Path) -> anyhow::Result<()> {
    dotenvy::from_path(path)?;
    Ok(())
}

/// Transport used to talk to the MCP client
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Server-Sent Events at /sse with messages posted to /messages/
    Sse,
    /// Standard input and output
    Stdio,
    /// Streamable HTTP at /mcp
    Http,
}

#[derive(Parser, Debug)]
#[command(version, about = "Run the AVM MCP server with different transport methods.")]
pub struct Cli {
    /// Transport method to use
    #[clap(long, value_enum, env = "MCP_TRANSPORT", default_value = "http")]
    pub transport: Transport,
    /// Host address to bind to. Ignored for stdio transport
    #[clap(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to use for SSE/HTTP transport. Ignored for stdio transport
    #[clap(long, env = "MCP_PORT", default_value_t = 8080)]
    pub port: u16,
    /// Enable debug mode
    #[clap(long, env = "MCP_DEBUG")]
    pub debug: bool,
    /// Log level used when debug mode is off
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: Level,
    /// Write logs to this file instead of stderr
    #[clap(long, env = "MCP_LOG_FILE")]
    pub log_file: Option<PathBuf>,
    /// Base URL of the container registry
    #[clap(long, env = "AVM_REGISTRY_URL", default_value = REGISTRY_BASE)]
    pub registry_url: String,
    /// Base URL of the raw repository content host
    #[clap(long, env = "AVM_RAW_CONTENT_URL", default_value = RAW_CONTENT_BASE)]
    pub raw_content_url: String,
    /// Timeout applied to every outbound request, in seconds
    #[clap(long, env = "AVM_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
    /// Maximum number of tag lists fetched at the same time
    #[clap(long, env = "AVM_MAX_CONCURRENT_REQUESTS", default_value_t = 5)]
    pub max_concurrent_requests: usize,
}

/// Settings resolved once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub log_level: Level,
    pub log_file: Option<PathBuf>,
    pub registry_url: String,
    pub raw_content_url: String,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl Config {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        if cli.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least one second");
        }
        if cli.max_concurrent_requests == 0 {
            anyhow::bail!("Maximum concurrent requests must be at least one");
        }

        Ok(Self {
            transport: cli.transport,
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            log_level: cli.log_level,
            log_file: cli.log_file,
            registry_url: cli.registry_url,
            raw_content_url: cli.raw_content_url,
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
            max_concurrent_requests: cli.max_concurrent_requests,
        })
    }

    /// Effective log level: debug wins, stdio stays quiet to keep the JSON-RPC stream clean
    pub fn effective_log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.transport == Transport::Stdio {
            Level::WARN
        } else {
            self.log_level
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
