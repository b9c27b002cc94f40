use crate::error::Result;
use crate::fill::payment_fields;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the fill_payment_form tool; the card comes from the request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FillPaymentParams {}

/// Fills credit card fields
#[derive(Default)]
pub struct FillPaymentTool;

impl Tool for FillPaymentTool {
    type Params = FillPaymentParams;

    fn name(&self) -> &str {
        "fill_payment_form"
    }

    fn description(&self) -> &str {
        "Fill payment/credit card form fields. Call this when you see credit card input fields on the checkout page."
    }

    fn execute_typed(&self, _params: FillPaymentParams, context: &mut ToolContext) -> Result<ToolResult> {
        let state = &context.state;
        let fields = payment_fields(&state.card, &state.shipping.full_name, &state.seeds.payment);
        let report = state.engine.fill(context.driver, &fields);

        let mut message = format!("Payment: filled {} fields.", report.filled.len());
        if !report.filled.is_empty() {
            message.push_str(&format!("\nFilled: {}", report.filled.join(", ")));
        }
        if !report.missed.is_empty() {
            // Hosted card fields usually live in cross-origin iframes
            message.push_str(&format!("\nMissed (fill manually, may be in iframes): {}", report.missed.join(", ")));
        }
        log::info!("Payment fill: {}/{} fields", report.filled.len(), report.total);

        context.state.fill_results.payment.extend(report.used_selectors.clone());

        Ok(ToolResult::success_with(serde_json::json!({
            "message": message,
            "filled": report.filled,
            "missed": report.missed,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CardDetails, CheckoutRequest};
    use crate::discovery::LearnedSelectors;
    use crate::fill::FillEngine;
    use crate::tools::CheckoutState;
    use crate::tools::test_support::EchoForm;

    #[test]
    fn test_fills_card_fields() {
        let mut request = CheckoutRequest::new("https://shop.nl/products/mug");
        request.shipping.full_name = "Jane Doe".to_string();
        request.card = CardDetails {
            number: "4111111111111111".to_string(),
            cvv: "123".to_string(),
            expiry_month: "7".to_string(),
            expiry_year: "2031".to_string(),
            cardholder_name: String::new(),
        };
        let mut seeds = LearnedSelectors::default();
        seeds.insert("card_cvv", "#cvc");

        let page = EchoForm::with(&["[autocomplete=\"cc-number\"]", "[autocomplete=\"cc-exp\"]", "#cvc", "#holder"]);
        let state = CheckoutState::new(&request, seeds).with_engine(FillEngine::new().pacing(0, 0));
        let mut context = ToolContext::new(&page, state);

        let result = FillPaymentTool.execute_typed(FillPaymentParams {}, &mut context).unwrap();
        let message = result.message().unwrap();
        assert!(message.starts_with("Payment: filled 3 fields."));
        assert!(message.contains("card_name"));

        let written = page.written.borrow();
        assert!(written.contains(&("[autocomplete=\"cc-exp\"]".to_string(), "07/31".to_string())));

        let payment = &context.state.fill_results.payment;
        assert_eq!(payment.get("card_cvv").map(String::as_str), Some("#cvc"));
        assert!(!payment.contains_key("card_name"));
        assert!(context.state.fill_results.form.is_empty());
    }
}
