mod common;

use std::collections::HashMap;

use avm_mcp_server::server::{
    AvmModules, LIST_MODULES_TOOL, ListModulesRequest, SCRAPE_DETAILS_TOOL,
};
use axum::http::StatusCode;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject};
use rmcp::service::{RoleClient, RunningService};
use rmcp::{ServerHandler, ServiceExt};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

fn text(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|content| content.raw.as_text())
        .map(|content| content.text.clone())
        .unwrap_or_default()
}

fn arguments(name: &str, value: &str) -> JsonObject {
    let mut arguments = JsonObject::new();
    arguments.insert(name.to_string(), json!(value));
    arguments
}

async fn server() -> AvmModules {
    let mut routes = HashMap::new();
    routes.insert(
        "/v2/_catalog?n=10000".to_string(),
        (
            StatusCode::OK,
            json!({ "repositories": ["bicep/avm/res/key-vault/vault", "bicep/other"] }).to_string(),
        ),
    );
    routes.insert(
        "/v2/bicep/avm/res/key-vault/vault/tags/list".to_string(),
        (StatusCode::OK, json!({ "tags": ["0.1.0"] }).to_string()),
    );
    let base = common::spawn(common::static_routes(routes)).await;

    AvmModules::new(common::registry(&base), common::github(&base))
}

/// Serve `server` over an in-memory pipe and connect a client to it
async fn connect(
    server: AvmModules,
) -> (RunningService<RoleClient, ()>, JoinHandle<anyhow::Result<()>>) {
    let (server_transport, client_transport) = tokio::io::duplex(4096);

    let server_handle = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        anyhow::Ok(())
    });

    let client = ().serve(client_transport).await.unwrap();
    (client, server_handle)
}

async fn call(
    client: &RunningService<RoleClient, ()>,
    name: &'static str,
    arguments: Option<JsonObject>,
) -> CallToolResult {
    client
        .call_tool(CallToolRequestParam {
            name: name.into(),
            arguments,
        })
        .await
        .unwrap()
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn test_tool_futures_are_send() {
    let base = common::spawn(common::static_routes(HashMap::new())).await;
    let registry = common::registry(&base);
    assert_send(&registry.fetch_modules(Some("storage")));
    assert_send(&registry.list_modules(None));

    let server = server().await;
    assert_send(&server.list_avm_modules(Parameters(ListModulesRequest::default())));
}

#[tokio::test]
async fn test_call_list_modules() {
    let (client, server_handle) = connect(server().await).await;

    let result = call(
        &client,
        LIST_MODULES_TOOL,
        Some(arguments("modulename", "key vault")),
    )
    .await;

    let modules: Vec<Value> = serde_json::from_str(&text(&result)).unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["name"], "bicep/avm/res/key-vault/vault");
    assert_eq!(modules[0]["versions"], json!(["0.1.0"]));

    client.cancel().await.unwrap();
    server_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_call_list_modules_without_arguments() {
    let (client, server_handle) = connect(server().await).await;

    let result = call(&client, LIST_MODULES_TOOL, None).await;

    let modules: Vec<Value> = serde_json::from_str(&text(&result)).unwrap();
    assert_eq!(modules.len(), 1);

    client.cancel().await.unwrap();
    server_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_call_scrape_reports_errors_as_text() {
    let (client, server_handle) = connect(server().await).await;

    let result = call(
        &client,
        SCRAPE_DETAILS_TOOL,
        Some(arguments("url", "not-a-valid-url")),
    )
    .await;

    assert!(text(&result).starts_with("# Error"));

    client.cancel().await.unwrap();
    server_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_call_rejects_unknown_tool_and_bad_arguments() {
    let (client, server_handle) = connect(server().await).await;

    let unknown = client
        .call_tool(CallToolRequestParam {
            name: "delete_everything".into(),
            arguments: None,
        })
        .await;
    assert!(unknown.is_err());

    let missing_url = client
        .call_tool(CallToolRequestParam {
            name: SCRAPE_DETAILS_TOOL.into(),
            arguments: None,
        })
        .await;
    assert!(missing_url.is_err());

    client.cancel().await.unwrap();
    server_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_client_sees_tools_and_prompts() {
    let (client, server_handle) = connect(server().await).await;

    let tools = client.list_all_tools().await.unwrap();
    let mut names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
    names.sort();
    assert_eq!(names, vec![LIST_MODULES_TOOL, SCRAPE_DETAILS_TOOL]);

    let prompts = client.list_all_prompts().await.unwrap();
    assert_eq!(prompts.len(), 3);

    client.cancel().await.unwrap();
    server_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_info() {
    let server = server().await;
    let info = server.get_info();

    assert_eq!(info.server_info.name, "avm-mcp-server");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());
    assert!(info.instructions.unwrap().contains(LIST_MODULES_TOOL));
}
