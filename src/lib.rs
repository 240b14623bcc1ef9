//! # AVM MCP Server
//!
//! A Model-Context-Protocol (MCP) server that helps an LLM discover Azure Verified
//! Modules (AVM) for Bicep and read their documentation.
//!
//! ## Features
//!
//! - List AVM modules published to the Microsoft container registry, with their versions
//! - Extract resource types, parameters and a full usage example from a module README
//! - Serve over stdio, streamable HTTP or Server-Sent Events
//!
//! ## Modules
//!
//! - `server`: MCP server implementation, tools, prompts and transports
//! - `registry`: container registry catalog and tag listing
//! - `github`: GitHub URL parsing and README retrieval
//! - `document`: README section extraction
//! - `fetch`: shared HTTP client and error translation
//! - `config`: command line and environment configuration

/// Command line and environment configuration
pub mod config;
/// README section extraction
pub mod document;
/// Shared HTTP client
pub mod fetch;
/// GitHub URL parsing and README retrieval
pub mod github;
/// Container registry integration
pub mod registry;
/// Server implementation and MCP tools
pub mod server;

use anyhow::Result;

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::github::GitHubClient;
use crate::registry::RegistryClient;
use crate::server::AvmModules;

/// Build the MCP handler with clients configured from `config`
pub fn build_server(config: &Config) -> Result<AvmModules> {
    let fetcher = HttpFetcher::new(config.request_timeout)?;
    let registry = RegistryClient::new(
        fetcher.clone(),
        &config.registry_url,
        config.max_concurrent_requests,
    );
    let github = GitHubClient::new(fetcher, &config.raw_content_url);

    Ok(AvmModules::new(registry, github))
}
