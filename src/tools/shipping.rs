use crate::error::Result;
use crate::fill::shipping_fields;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the fill_shipping_form tool; the values come from the request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FillShippingParams {}

/// Fills contact and shipping address fields
#[derive(Default)]
pub struct FillShippingTool;

impl Tool for FillShippingTool {
    type Params = FillShippingParams;

    fn name(&self) -> &str {
        "fill_shipping_form"
    }

    fn description(&self) -> &str {
        "Fill shipping/contact form fields on the checkout page. Call this ONCE when you reach the \
         checkout page with shipping form fields visible, then check which fields were filled."
    }

    fn execute_typed(&self, _params: FillShippingParams, context: &mut ToolContext) -> Result<ToolResult> {
        let state = &context.state;
        let saved = &state.seeds.form;
        let fields = shipping_fields(&state.email, &state.shipping, saved);
        let report = state.engine.fill(context.driver, &fields);

        let from_saved = report
            .used_selectors
            .iter()
            .filter(|(field, selector)| saved.get(*field) == Some(*selector))
            .count();

        let mut message = report.summary();
        if !saved.is_empty() {
            message.push_str(&format!("\n{} fields used saved selectors", from_saved));
        }
        log::info!(
            "Shipping fill: {}/{} ({} verified, {} from saved selectors)",
            report.filled.len(),
            report.total,
            report.verified.len(),
            from_saved
        );

        context.state.fill_results.form.extend(report.used_selectors.clone());

        Ok(ToolResult::success_with(serde_json::json!({
            "message": message,
            "filled": report.filled,
            "missed": report.missed,
            "verified": report.verified,
            "retried": report.retried,
            "total": report.total,
            "from_saved": from_saved,
        })))
    }
}
