//! Custom tools the checkout agent can call
//!
//! Each tool declares typed parameters with a JSON schema. The registry erases the
//! parameter type so an agent can dispatch by name with raw JSON arguments.

pub mod context;
pub mod decision;
pub mod payment;
pub mod shipping;
pub mod shopify;

#[cfg(test)]
mod test_support;

pub use context::{CheckoutState, ToolContext};
pub use decision::{ReportDecisionParams, ReportDecisionTool};
pub use payment::{FillPaymentParams, FillPaymentTool};
pub use shipping::{FillShippingParams, FillShippingTool};
pub use shopify::{SHOPIFY_CART_SCRIPT, SHOPIFY_DETECT_SCRIPT, ShopifyInstantCartParams, ShopifyInstantCartTool};

use crate::browser::PageDriver;
use crate::error::{CheckoutError, Result};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Names of the tools an agent trace can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    FillShippingForm,
    FillPaymentForm,
    ReportDecisionNeeded,
    ShopifyInstantCart,
    /// The agent's own terminal action
    Done,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FillShippingForm => "fill_shipping_form",
            Self::FillPaymentForm => "fill_payment_form",
            Self::ReportDecisionNeeded => "report_decision_needed",
            Self::ShopifyInstantCart => "shopify_instant_cart",
            Self::Done => "done",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fill_shipping_form" => Some(Self::FillShippingForm),
            "fill_payment_form" => Some(Self::FillPaymentForm),
            "report_decision_needed" => Some(Self::ReportDecisionNeeded),
            "shopify_instant_cart" => Some(Self::ShopifyInstantCart),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a tool call as reported back to the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    /// The `message` field of `data`, if any
    pub fn message(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.get("message")).and_then(Value::as_str)
    }
}

/// A tool with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// Instructions shown to the agent
    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or(Value::Null)
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;
}

/// Object-safe form of [`Tool`]
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> &str {
        Tool::description(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let params = if params.is_null() { Value::Object(Default::default()) } else { params };
        let typed: T::Params = serde_json::from_value(params).map_err(|e| CheckoutError::InvalidParams {
            tool: Tool::name(self).to_string(),
            reason: e.to_string(),
        })?;
        self.execute_typed(typed, context)
    }
}

/// Description of a registered tool, as handed to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every checkout tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ShopifyInstantCartTool);
        registry.register(FillShippingTool);
        registry.register(FillPaymentTool);
        registry.register(ReportDecisionTool);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| CheckoutError::ToolNotFound(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}

/// What an agent is handed to call tools during one checkout
pub struct ToolSession<'a> {
    registry: ToolRegistry,
    context: ToolContext<'a>,
}

impl<'a> ToolSession<'a> {
    pub fn new(registry: ToolRegistry, context: ToolContext<'a>) -> Self {
        Self { registry, context }
    }

    pub fn driver(&self) -> &'a dyn PageDriver {
        self.context.driver
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn state(&self) -> &CheckoutState {
        &self.context.state
    }

    pub fn call(&mut self, name: &str, params: Value) -> Result<ToolResult> {
        self.registry.execute(name, params, &mut self.context)
    }

    /// Consume the session, keeping what the tools recorded
    pub fn into_state(self) -> CheckoutState {
        self.context.state
    }
}
