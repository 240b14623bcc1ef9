use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{
    GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::{
    Error as McpError, RoleServer, ServerHandler, schemars, service::RequestContext, tool,
    tool_handler, tool_router,
};
use serde::Deserialize;

use crate::github::GitHubClient;
use crate::registry::RegistryClient;

use super::prompts;

pub const LIST_MODULES_TOOL: &str = "list_avm_modules";
pub const SCRAPE_DETAILS_TOOL: &str = "scrape_avm_module_details";

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListModulesRequest {
    #[schemars(description = "AVM module name to filter by")]
    #[serde(default)]
    pub modulename: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScrapeDetailsRequest {
    #[schemars(description = "AVM GitHub repository URL")]
    pub url: String,
}

/// MCP handler exposing the AVM registry and README tools
#[derive(Clone)]
pub struct AvmModules {
    registry: Arc<RegistryClient>,
    github: Arc<GitHubClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AvmModules {
    pub fn new(registry: RegistryClient, github: GitHubClient) -> Self {
        Self {
            registry: Arc::new(registry),
            github: Arc::new(github),
            tool_router: Self::tool_router(),
        }
    }

    /// Tool catalogue with generated argument schemas, sorted by name
    pub fn tools() -> Vec<Tool> {
        let mut tools = Self::tool_router().list_all();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    #[tool(
        description = "List Azure Verified Modules (AVM). If modulename is provided, only modules matching that name are returned. Returns a JSON list of AVM modules with their versions and documentation links."
    )]
    pub async fn list_avm_modules(
        &self,
        Parameters(ListModulesRequest { modulename }): Parameters<ListModulesRequest>,
    ) -> String {
        tracing::debug!("Listing modules with filter {:?}", modulename);
        self.registry.list_modules(modulename.as_deref()).await
    }

    #[tool(
        description = "Fetch the README.md of an AVM module and extract its Resource Types, Parameters and the 'Using large parameter set' usage example as markdown. Takes a GitHub URL such as https://github.com/Azure/bicep-registry-modules/tree/main/avm/res/storage/storage-account"
    )]
    pub async fn scrape_avm_module_details(
        &self,
        Parameters(ScrapeDetailsRequest { url }): Parameters<ScrapeDetailsRequest>,
    ) -> String {
        tracing::debug!("Scraping module details from {}", url);
        self.github.scrape_details(&url).await
    }
}

#[tool_handler]
impl ServerHandler for AvmModules {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some("This server provides tools to discover Azure Verified Modules (AVM) for Bicep. Use 'list_avm_modules' to list modules and their versions, optionally filtered by name, and 'scrape_avm_module_details' with a module documentation URL to read its resource types, parameters and a full usage example.".to_string()),
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: prompts::prompts(),
        })
    }

    async fn get_prompt(
        &self,
        GetPromptRequestParam { name, arguments }: GetPromptRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        prompts::get_prompt(&name, arguments.as_ref())
    }
}
