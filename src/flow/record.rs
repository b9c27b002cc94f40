use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical field name → CSS selector, in discovery order
pub type SelectorSet = IndexMap<String, String>;

/// E-commerce platform a site runs on (best effort)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Shopify,
    Woocommerce,
    Magento,
    Bigcommerce,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Platform {
    /// Parse a platform tag, mapping anything unrecognised to `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "shopify" => Self::Shopify,
            "woocommerce" => Self::Woocommerce,
            "magento" => Self::Magento,
            "bigcommerce" => Self::Bigcommerce,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shopify => "shopify",
            Self::Woocommerce => "woocommerce",
            Self::Magento => "magento",
            Self::Bigcommerce => "bigcommerce",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a recorded click was for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPurpose {
    CookieConsent,
    AddToCart,
    GoToCheckout,
    GuestCheckout,
    Continue,
    Confirm,
    ClosePopup,
    SelectPayment,
    #[default]
    #[serde(other)]
    Other,
}

impl StepPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CookieConsent => "cookie_consent",
            Self::AddToCart => "add_to_cart",
            Self::GoToCheckout => "go_to_checkout",
            Self::GuestCheckout => "guest_checkout",
            Self::Continue => "continue",
            Self::Confirm => "confirm",
            Self::ClosePopup => "close_popup",
            Self::SelectPayment => "select_payment",
            Self::Other => "other",
        }
    }
}

/// A recorded click on a navigation element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickStep {
    /// Most stable CSS selector we could derive
    #[serde(default)]
    pub selector: Option<String>,

    /// Accessible text, at most 100 characters
    #[serde(default)]
    pub text: String,

    /// Lower-cased tag name
    #[serde(default)]
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Page URL the click happened on
    #[serde(default)]
    pub url_at: Option<String>,

    #[serde(default)]
    pub purpose: StepPurpose,
}

/// One replayable action of a learned checkout path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigationStep {
    Click(ClickStep),
    Navigate { url: String },
    Wait { seconds: f64 },
    GoBack {},
}

impl NavigationStep {
    pub fn as_click(&self) -> Option<&ClickStep> {
        match self {
            Self::Click(click) => Some(click),
            _ => None,
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(self, Self::Click(_))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Click(_) => "click",
            Self::Navigate { .. } => "navigate",
            Self::Wait { .. } => "wait",
            Self::GoBack {} => "go_back",
        }
    }
}

/// The persisted, learned checkout path for one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Normalized domain, the primary key
    pub domain: String,

    #[serde(default)]
    pub platform: Platform,

    /// Substring marking the checkout sub-path, e.g. `/checkout/`
    #[serde(default)]
    pub checkout_url_pattern: Option<String>,

    /// Replaced wholesale on every save that supplies steps
    #[serde(default)]
    pub navigation_steps: Vec<NavigationStep>,

    /// Merged on save; new values win
    #[serde(default)]
    pub form_selectors: SelectorSet,

    #[serde(default)]
    pub payment_selectors: SelectorSet,

    #[serde(default)]
    pub success_count: u32,

    #[serde(default)]
    pub failure_count: u32,

    #[serde(default)]
    pub consecutive_failures: u32,

    /// RFC 3339 UTC, fixed width so string order is time order
    #[serde(default)]
    pub last_success: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Final URL reached on the last success
    #[serde(default)]
    pub last_url: Option<String>,
}

impl FlowRecord {
    /// Empty record for a domain that has never succeeded
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            platform: Platform::Unknown,
            checkout_url_pattern: None,
            navigation_steps: Vec::new(),
            form_selectors: SelectorSet::new(),
            payment_selectors: SelectorSet::new(),
            success_count: 0,
            failure_count: 0,
            consecutive_failures: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            last_url: None,
        }
    }

    /// Number of recorded click steps
    pub fn click_count(&self) -> usize {
        self.navigation_steps.iter().filter(|s| s.is_click()).count()
    }
}

/// Lightweight listing entry for a stored flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub domain: String,
    pub platform: Platform,
    pub success_count: u32,
    pub failure_count: u32,
    pub consecutive_failures: u32,
    pub last_success: Option<String>,
    pub nav_steps: usize,
    pub form_fields: usize,
    pub payment_fields: usize,
}

impl From<&FlowRecord> for FlowSummary {
    fn from(record: &FlowRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            platform: record.platform,
            success_count: record.success_count,
            failure_count: record.failure_count,
            consecutive_failures: record.consecutive_failures,
            last_success: record.last_success.clone(),
            nav_steps: record.navigation_steps.len(),
            form_fields: record.form_selectors.len(),
            payment_fields: record.payment_selectors.len(),
        }
    }
}

/// Data from a successful run, applied by [`FlowStore::save`](super::FlowStore::save)
#[derive(Debug, Clone, Default)]
pub struct FlowUpdate {
    pub form_selectors: SelectorSet,
    pub payment_selectors: SelectorSet,
    /// `None` keeps the stored steps; `Some` replaces them, even with an empty list
    pub navigation_steps: Option<Vec<NavigationStep>>,
    pub checkout_url_pattern: Option<String>,
    pub platform: Option<Platform>,
    pub final_url: Option<String>,
}

impl FlowUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_selectors(mut self, selectors: SelectorSet) -> Self {
        self.form_selectors = selectors;
        self
    }

    pub fn payment_selectors(mut self, selectors: SelectorSet) -> Self {
        self.payment_selectors = selectors;
        self
    }

    pub fn navigation_steps(mut self, steps: Vec<NavigationStep>) -> Self {
        self.navigation_steps = Some(steps);
        self
    }

    pub fn checkout_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.checkout_url_pattern = Some(pattern.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_step_wire_format() {
        let step = NavigationStep::Click(ClickStep {
            selector: Some("#buy".to_string()),
            text: "Add to cart".to_string(),
            tag: "button".to_string(),
            aria_label: None,
            role: None,
            url_at: Some("https://shop.nl/products/x".to_string()),
            purpose: StepPurpose::AddToCart,
        });

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["action"], "click");
        assert_eq!(json["purpose"], "add_to_cart");
        assert_eq!(json["url_at"], "https://shop.nl/products/x");
        assert!(json.get("aria_label").is_none());

        let wait = serde_json::to_value(NavigationStep::Wait { seconds: 2.0 }).unwrap();
        assert_eq!(wait, serde_json::json!({"action": "wait", "seconds": 2.0}));
    }

    #[test]
    fn test_reads_steps_with_extra_fields() {
        let json = r#"[
            {"action": "navigate", "url": "https://shop.nl/cart", "purpose": "navigation"},
            {"action": "go_back", "purpose": "navigation"},
            {"action": "click", "text": "Verder", "selector": null, "tag": "a", "url_at": null, "purpose": "continue"}
        ]"#;
        let steps: Vec<NavigationStep> = serde_json::from_str(json).unwrap();

        assert_eq!(steps[0], NavigationStep::Navigate { url: "https://shop.nl/cart".to_string() });
        assert_eq!(steps[1], NavigationStep::GoBack {});
        assert_eq!(steps[2].as_click().unwrap().purpose, StepPurpose::Continue);
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        let purpose: StepPurpose = serde_json::from_str("\"page_load\"").unwrap();
        assert_eq!(purpose, StepPurpose::Other);

        let platform: Platform = serde_json::from_str("\"prestashop\"").unwrap();
        assert_eq!(platform, Platform::Unknown);
        assert_eq!(Platform::from_tag(" Shopify\n"), Platform::Shopify);
    }

    #[test]
    fn test_minimal_record_loads() {
        let record: FlowRecord = serde_json::from_str(r#"{"domain": "shop.nl"}"#).unwrap();
        assert_eq!(record, FlowRecord::new("shop.nl"));
    }

    #[test]
    fn test_summary_counts() {
        let mut record = FlowRecord::new("shop.nl");
        record.form_selectors.insert("email".to_string(), "#email".to_string());
        record.navigation_steps.push(NavigationStep::GoBack {});

        let summary = FlowSummary::from(&record);
        assert_eq!(summary.nav_steps, 1);
        assert_eq!(summary.form_fields, 1);
        assert_eq!(summary.payment_fields, 0);
    }
}
