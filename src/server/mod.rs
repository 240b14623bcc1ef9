//! MCP handler and the transports serving it

mod prompts;
mod tools;
pub mod transport;

pub use prompts::{get_prompt, prompts, render_prompt};
pub use tools::{
    AvmModules, LIST_MODULES_TOOL, ListModulesRequest, SCRAPE_DETAILS_TOOL, ScrapeDetailsRequest,
};
