use crate::discovery::LearnedSelectors;
use crate::flow::SelectorSet;
use serde::{Deserialize, Serialize};

/// Marker the agent prints when a dry run reached the final review page
pub const DRY_RUN_COMPLETE: &str = "DRY_RUN_COMPLETE";
/// Marker the agent prints after reporting a decision point
pub const DECISION_NEEDED: &str = "DECISION_NEEDED";

/// Where the order ships to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    /// ISO 3166 alpha-2 code
    pub country: String,
    pub phone: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "US".to_string(),
            phone: String::new(),
        }
    }
}

impl ShippingAddress {
    /// First word, and the remaining words (or the first word again for one-word names)
    pub fn split_name(&self) -> (String, String) {
        let mut words = self.full_name.split_whitespace();
        let Some(first) = words.next() else {
            return (String::new(), String::new());
        };

        let rest: Vec<&str> = words.collect();
        let last = if rest.is_empty() { first.to_string() } else { rest.join(" ") };
        (first.to_string(), last)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    pub number: String,
    pub cvv: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cardholder_name: String,
}

impl CardDetails {
    /// Expiry as `MM/YY`
    pub fn expiry(&self) -> String {
        let month = self.expiry_month.trim();
        let month = if month.len() == 1 { format!("0{}", month) } else { month.to_string() };

        let year = self.expiry_year.trim();
        let year = if year.len() == 4 && year.is_ascii() { &year[2..] } else { year };

        format!("{}/{}", month, year)
    }
}

/// Kind of problem the agent wants a human to decide on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    VariantUnavailable,
    PriceMismatch,
    ShippingOptions,
    PaymentDeclined,
    Captcha,
    #[serde(other)]
    Other,
}

impl DecisionType {
    /// Parse a tag as the agent wrote it; unknown tags become `Other`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "variant_unavailable" => Self::VariantUnavailable,
            "price_mismatch" => Self::PriceMismatch,
            "shipping_options" => Self::ShippingOptions,
            "payment_declined" => Self::PaymentDeclined,
            "captcha" => Self::Captcha,
            _ => Self::Other,
        }
    }
}

/// A problem surfaced to the caller instead of being resolved by guessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPoint {
    #[serde(rename = "type")]
    pub kind: DecisionType,

    pub message: String,

    /// Alternatives offered by the site, e.g. available sizes
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<String>,
}

/// A checkout to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub product_url: String,

    #[serde(default = "default_product_title")]
    pub product_title: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub shipping: ShippingAddress,

    #[serde(default)]
    pub card: CardDetails,

    /// Stop before the final purchase button
    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Selector seeds that win over the stored flow's selectors
    #[serde(default)]
    pub saved_form_selectors: Option<SelectorSet>,

    #[serde(default)]
    pub saved_payment_selectors: Option<SelectorSet>,
}

impl CheckoutRequest {
    pub fn new(product_url: impl Into<String>) -> Self {
        Self {
            product_url: product_url.into(),
            product_title: default_product_title(),
            email: String::new(),
            shipping: ShippingAddress::default(),
            card: CardDetails::default(),
            dry_run: true,
            max_steps: default_max_steps(),
            saved_form_selectors: None,
            saved_payment_selectors: None,
        }
    }
}

fn default_product_title() -> String {
    "Product".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_steps() -> u32 {
    50
}

/// Outcome of one checkout attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default)]
    pub final_url: Option<String>,

    pub execution_ms: u64,

    /// Agent actions taken after any replay
    pub llm_steps: usize,

    pub dry_run: bool,

    #[serde(default)]
    pub learned_selectors: Option<LearnedSelectors>,

    /// Cached clicks handed to the replay automaton; 0 means a full agent pass
    pub replay_steps_used: usize,

    pub decision_needed: bool,

    #[serde(default)]
    pub decision_points: Vec<DecisionPoint>,
}

impl CheckoutResult {
    /// Failed result carrying only an error
    pub fn failed(error: impl Into<String>, dry_run: bool, execution_ms: u64) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            dry_run,
            execution_ms,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(name: &str) -> ShippingAddress {
        ShippingAddress { full_name: name.to_string(), ..Default::default() }
    }

    #[test]
    fn test_split_name() {
        assert_eq!(address("Jane van der Berg").split_name(), ("Jane".to_string(), "van der Berg".to_string()));
        assert_eq!(address("Cher").split_name(), ("Cher".to_string(), "Cher".to_string()));
        assert_eq!(address("  ").split_name(), (String::new(), String::new()));
    }

    #[test]
    fn test_expiry_format() {
        let card = CardDetails {
            expiry_month: "3".to_string(),
            expiry_year: "2028".to_string(),
            ..Default::default()
        };
        assert_eq!(card.expiry(), "03/28");

        let card = CardDetails {
            expiry_month: "11".to_string(),
            expiry_year: "29".to_string(),
            ..Default::default()
        };
        assert_eq!(card.expiry(), "11/29");
    }

    #[test]
    fn test_request_defaults() {
        let request: CheckoutRequest =
            serde_json::from_str(r#"{"product_url": "https://shop.nl/p/1"}"#).unwrap();
        assert!(request.dry_run);
        assert_eq!(request.max_steps, 50);
        assert_eq!(request.product_title, "Product");
        assert_eq!(request.shipping.country, "US");
        assert_eq!(request, CheckoutRequest::new("https://shop.nl/p/1"));
    }

    #[test]
    fn test_decision_point_wire_format() {
        let point: DecisionPoint = serde_json::from_str(
            r#"{"type": "variant_unavailable", "message": "XL sold out", "options": ["L", "2XL"], "expected_value": "XL"}"#,
        )
        .unwrap();
        assert_eq!(point.kind, DecisionType::VariantUnavailable);
        assert_eq!(point.options, vec!["L", "2XL"]);

        let unknown: DecisionType = serde_json::from_str("\"out_of_stock\"").unwrap();
        assert_eq!(unknown, DecisionType::Other);
        assert_eq!(DecisionType::from_tag(" Captcha "), DecisionType::Captcha);
    }
}
