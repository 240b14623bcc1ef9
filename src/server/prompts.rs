use rmcp::Error as McpError;
use rmcp::model::{
    GetPromptResult, JsonObject, Prompt, PromptArgument, PromptMessage, PromptMessageContent,
    PromptMessageRole,
};
use serde_json::json;

pub const FIND_MODULE_PROMPT: &str = "find_avm_module_prompt";
pub const MODULE_DETAILS_PROMPT: &str = "get_avm_module_details_prompt";
pub const SUGGEST_MODULE_PROMPT: &str = "suggest_avm_for_service_prompt";

fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required: Some(required),
    }
}

pub fn prompts() -> Vec<Prompt> {
    vec![
        Prompt::new(
            FIND_MODULE_PROMPT,
            Some("A prompt to find Azure Verified Modules (AVM)."),
            Some(vec![argument(
                "search_term",
                "Optional term the module names should match",
                false,
            )]),
        ),
        Prompt::new(
            MODULE_DETAILS_PROMPT,
            Some("A prompt to get the details of a specific AVM."),
            Some(vec![argument("module_name", "Name of the AVM module", true)]),
        ),
        Prompt::new(
            SUGGEST_MODULE_PROMPT,
            Some("A prompt to suggest an AVM for a specific Azure service."),
            Some(vec![argument(
                "azure_service",
                "The Azure service to deploy",
                true,
            )]),
        ),
    ]
}

fn string_argument<'a>(arguments: Option<&'a JsonObject>, name: &str) -> Option<&'a str> {
    arguments?
        .get(name)?
        .as_str()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required_argument<'a>(arguments: Option<&'a JsonObject>, name: &str) -> Result<&'a str, McpError> {
    string_argument(arguments, name).ok_or_else(|| {
        McpError::invalid_params(
            format!("missing required argument '{name}'"),
            Some(json!({ "argument": name })),
        )
    })
}

/// Render the prompt text for `name`
pub fn render_prompt(name: &str, arguments: Option<&JsonObject>) -> Result<String, McpError> {
    let text = match name {
        FIND_MODULE_PROMPT => match string_argument(arguments, "search_term") {
            Some(search_term) => format!(
                "Please find the AVM modules that match the search term '{search_term}'.\n\
                 For each module, provide the name, versions, and a link to the documentation."
            ),
            None => "Please list all available Azure Verified Modules (AVM).\n\
                     For each module, provide the name, versions, and a link to the documentation."
                .to_string(),
        },
        MODULE_DETAILS_PROMPT => {
            let module_name = required_argument(arguments, "module_name")?;
            format!(
                "Please provide the details for the AVM module '{module_name}'.\n\
                 I am interested in the Resource Types, Parameters, and Usage Examples.\n\
                 Make sure you include the latest version available in the Usage Examples."
            )
        }
        SUGGEST_MODULE_PROMPT => {
            let azure_service = required_argument(arguments, "azure_service")?;
            format!(
                "I need to deploy a '{azure_service}' in Azure.\n\
                 Can you suggest a suitable Azure Verified Module (AVM) for this?\n\
                 Please provide the module name and why you are suggesting it."
            )
        }
        _ => return Err(McpError::invalid_params("prompt not found", None)),
    };

    Ok(text)
}

pub fn get_prompt(name: &str, arguments: Option<&JsonObject>) -> Result<GetPromptResult, McpError> {
    let prompt = render_prompt(name, arguments)?;

    Ok(GetPromptResult {
        description: None,
        messages: vec![PromptMessage {
            role: PromptMessageRole::User,
            content: PromptMessageContent::text(prompt),
        }],
    })
}
