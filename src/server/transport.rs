use std::time::Duration;

use anyhow::Result;
use axum::{Json, Router, routing::get};
use rmcp::ServiceExt;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Transport};

use super::AvmModules;

pub const MCP_PATH: &str = "/mcp";
pub const SSE_PATH: &str = "/sse";
pub const MESSAGES_PATH: &str = "/messages/";
pub const TOOLS_PATH: &str = "/tools";

/// `GET /tools`: name, description and input schema of every tool
pub async fn list_tools() -> Json<Value> {
    let tools: Vec<Value> = AvmModules::tools()
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema.as_ref(),
            })
        })
        .collect();

    Json(json!({ "tools": tools }))
}

/// Routes shared by the HTTP transports
pub fn tools_router() -> Router {
    Router::new().route(TOOLS_PATH, get(list_tools))
}

/// Streamable HTTP service mounted at `/mcp`, next to `/tools`
pub fn http_router(server: AvmModules) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    tools_router().nest_service(MCP_PATH, service)
}

/// Serve the MCP server over the transport selected in `config`
pub async fn serve(server: AvmModules, config: &Config) -> Result<()> {
    tracing::info!("Debug mode: {}", if config.debug { "ON" } else { "OFF" });
    tracing::info!("Transport: {:?}", config.transport);

    match config.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, config).await,
        Transport::Sse => serve_sse(server, config).await,
    }
}

pub async fn serve_stdio(server: AvmModules) -> Result<()> {
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}

pub async fn serve_http(server: AvmModules, config: &Config) -> Result<()> {
    let address = config.bind_address();
    tracing::info!("Starting MCP server with Streamable HTTP transport at http://{}", address);
    tracing::info!("MCP Endpoint: http://{}{}/", address, MCP_PATH);
    tracing::info!("Tools Endpoint: http://{}{}", address, TOOLS_PATH);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, http_router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Application shutting down...");
    Ok(())
}

pub async fn serve_sse(server: AvmModules, config: &Config) -> Result<()> {
    let address = config.bind_address();
    tracing::info!("Starting MCP server with SSE transport at http://{}", address);
    tracing::info!("SSE Endpoint: http://{}{}", address, SSE_PATH);
    tracing::info!("Messages Endpoint: http://{}{}", address, MESSAGES_PATH);
    tracing::info!("Tools Endpoint: http://{}{}", address, TOOLS_PATH);

    let sse_config = SseServerConfig {
        bind: address.parse()?,
        sse_path: SSE_PATH.to_string(),
        post_path: MESSAGES_PATH.to_string(),
        ct: CancellationToken::new(),
        sse_keep_alive: Some(Duration::from_secs(15)),
    };

    let (sse_server, router) = SseServer::new(sse_config);
    let listener = tokio::net::TcpListener::bind(sse_server.config.bind).await?;
    let ct = sse_server.config.ct.child_token();

    let http = axum::serve(listener, router.merge(tools_router())).with_graceful_shutdown(
        async move {
            ct.cancelled().await;
            tracing::info!("SSE server cancelled");
        },
    );

    let service_ct = sse_server.with_service(move || server.clone());
    let handle = tokio::spawn(async move {
        if let Err(e) = http.await {
            tracing::error!("SSE server shutdown with error: {}", e);
        }
    });

    shutdown_signal().await;
    service_ct.cancel();
    handle.await?;

    tracing::info!("Application shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
