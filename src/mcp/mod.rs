//! MCP (Model Context Protocol) server for managing learned checkout flows
//!
//! Exposes the flow store to MCP clients: listing with health, inspection, deletion
//! and the compiled replay script of a domain.

pub mod handler;
pub use handler::FlowServer;

use crate::flow::{FlowOverview, evaluate};
use crate::replay::plan_for_flow;
use crate::utils::normalize_domain;
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters naming one flow
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainParams {
    /// Domain or any URL on it, e.g. "shop.nl" or "https://www.shop.nl/products/mug"
    pub domain: String,
}

/// Replay script parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReplayScriptParams {
    /// Domain or any URL on it
    pub domain: String,

    /// Product page that clicks without a recorded page are attributed to
    #[serde(default)]
    pub product_url: Option<String>,
}

/// Serialize a value as pretty JSON text content
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn no_flow(domain: &str) -> McpError {
    McpError::invalid_params(format!("No saved flow for '{}'", normalize_domain(domain)), None)
}

#[tool_router]
impl FlowServer {
    /// List every stored flow
    #[tool(description = "List all learned checkout flows with their success counts and health status")]
    fn flow_list(&self) -> Result<CallToolResult, McpError> {
        let flows: Vec<FlowOverview> = self.store().records().iter().map(FlowOverview::from).collect();
        json_result(&flows)
    }

    /// Full record of one flow
    #[tool(description = "Get the full learned flow for a domain: navigation steps, form and payment selectors, counters")]
    fn flow_get(&self, params: Parameters<DomainParams>) -> Result<CallToolResult, McpError> {
        let flow = self.store().load(&params.0.domain).ok_or_else(|| no_flow(&params.0.domain))?;
        json_result(&flow)
    }

    /// Remove one flow
    #[tool(description = "Delete the learned flow for a domain so the next checkout learns from scratch")]
    fn flow_delete(&self, params: Parameters<DomainParams>) -> Result<CallToolResult, McpError> {
        let domain = normalize_domain(&params.0.domain);
        let deleted = self.store().delete(&domain);
        json_result(&serde_json::json!({ "domain": domain, "deleted": deleted }))
    }

    /// Health evaluation of one flow
    #[tool(description = "Evaluate the health of a domain's flow: status, success rate and whether it needs re-learning")]
    fn flow_health(&self, params: Parameters<DomainParams>) -> Result<CallToolResult, McpError> {
        let flow = self.store().load(&params.0.domain).ok_or_else(|| no_flow(&params.0.domain))?;
        json_result(&evaluate(&flow))
    }

    /// Compiled replay script of one flow
    #[tool(description = "Compile the page replay script for a domain's cached pre-form navigation clicks")]
    fn flow_replay_script(&self, params: Parameters<ReplayScriptParams>) -> Result<CallToolResult, McpError> {
        let ReplayScriptParams { domain, product_url } = params.0;
        let flow = self.store().load(&domain).ok_or_else(|| no_flow(&domain))?;

        let plan = plan_for_flow(&flow, product_url.as_deref());
        if plan.is_empty() {
            return Err(McpError::invalid_params(
                format!("Flow for '{}' has no replayable clicks", flow.domain),
                None,
            ));
        }

        let script = plan
            .to_script(self.timing())
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(script)]))
    }
}
