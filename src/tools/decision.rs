use crate::checkout::{DECISION_NEEDED, DecisionPoint, DecisionType};
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the report_decision_needed tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportDecisionParams {
    /// One of variant_unavailable, price_mismatch, shipping_options, payment_declined, captcha
    pub decision_type: String,

    /// What the user needs to decide
    pub message: String,

    /// Comma-separated alternatives, e.g. available sizes
    #[serde(default)]
    pub options: String,

    #[serde(default)]
    pub expected_value: String,

    #[serde(default)]
    pub actual_value: String,
}

/// Records a problem for the user instead of letting the agent guess
#[derive(Default)]
pub struct ReportDecisionTool;

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

impl Tool for ReportDecisionTool {
    type Params = ReportDecisionParams;

    fn name(&self) -> &str {
        "report_decision_needed"
    }

    fn description(&self) -> &str {
        "Report a problem that needs user input: an unavailable variant or size (list the alternatives), \
         a price mismatch (expected vs actual), multiple shipping options (list them with prices), a declined \
         or unavailable payment method, or a CAPTCHA. After reporting, output DECISION_NEEDED as your final message."
    }

    fn execute_typed(&self, params: ReportDecisionParams, context: &mut ToolContext) -> Result<ToolResult> {
        let point = DecisionPoint {
            kind: DecisionType::from_tag(&params.decision_type),
            message: params.message.trim().to_string(),
            options: params.options.split(',').filter_map(non_empty).collect(),
            expected_value: non_empty(&params.expected_value),
            actual_value: non_empty(&params.actual_value),
        };

        log::info!("Decision needed: {} ({})", params.decision_type, point.message);
        context.state.decision_points.push(point);

        Ok(ToolResult::success_with(serde_json::json!({
            "message": format!(
                "Decision point recorded: {} - {}. Output {} as your final message to pause checkout and ask the user.",
                params.decision_type, params.message, DECISION_NEEDED
            ),
        })))
    }
}
