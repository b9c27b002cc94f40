use crate::config::ReplayTiming;
use crate::error::Result;
use crate::flow::{NavigationStep, StepPurpose};
use crate::utils::{truncate_chars, url_path};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const REPLAY_TEMPLATE: &str = include_str!("replay.js");

/// Longest text / aria-label carried into the page
const MAX_TARGET_TEXT: usize = 60;

/// Path marker of the pages whose continue/confirm buttons follow form filling
const CHECKOUT_SUBPAGE: &str = "/checkout/";

/// One click the page automaton performs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayTarget {
    pub selector: Option<String>,
    pub text: String,
    pub aria_label: Option<String>,
    pub purpose: StepPurpose,
}

/// Cached clicks grouped by the page path they belong to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayPlan {
    groups: IndexMap<String, Vec<ReplayTarget>>,
}

/// Cut the cached path down to the part that is safe to replay blindly.
///
/// Waits are dropped. The walk stops at the first continue/confirm click on a checkout
/// sub-page; that click and everything after it depend on filled forms.
pub fn select_pre_form_steps(steps: &[NavigationStep]) -> Vec<NavigationStep> {
    let mut selected = Vec::new();

    for step in steps {
        match step {
            NavigationStep::Wait { .. } => continue,
            NavigationStep::Click(click)
                if matches!(click.purpose, StepPurpose::Continue | StepPurpose::Confirm)
                    && click.url_at.as_deref().is_some_and(is_checkout_subpage) =>
            {
                log::info!(
                    "Stopping replay before post-form step '{}' ({})",
                    truncate_chars(&click.text, 40),
                    click.purpose.as_str()
                );
                break;
            }
            _ => selected.push(step.clone()),
        }
    }

    selected
}

/// A path with `/checkout/` followed by at least one more character
fn is_checkout_subpage(url: &str) -> bool {
    url.match_indices(CHECKOUT_SUBPAGE)
        .any(|(idx, _)| idx + CHECKOUT_SUBPAGE.len() < url.len())
}

impl ReplayPlan {
    /// Group the click steps by the path of the page they happened on.
    /// Steps without a page URL are attributed to `product_url`.
    pub fn compile(steps: &[NavigationStep], product_url: &str) -> Self {
        let mut groups: IndexMap<String, Vec<ReplayTarget>> = IndexMap::new();

        for click in steps.iter().filter_map(NavigationStep::as_click) {
            let url_at = click.url_at.as_deref().filter(|u| !u.is_empty()).unwrap_or(product_url);
            let mut path = url_path(url_at);
            if path.is_empty() {
                path = "/".to_string();
            }

            groups.entry(path).or_default().push(ReplayTarget {
                selector: click.selector.clone().filter(|s| !s.is_empty()),
                text: truncate_chars(&click.text, MAX_TARGET_TEXT),
                aria_label: click
                    .aria_label
                    .as_deref()
                    .filter(|l| !l.is_empty())
                    .map(|l| truncate_chars(l, MAX_TARGET_TEXT)),
                purpose: click.purpose,
            });
        }

        let plan = Self { groups };
        log::info!("Replay plan: {} page groups, {} clicks", plan.groups.len(), plan.click_count());
        for (path, targets) in &plan.groups {
            let purposes: Vec<&str> = targets.iter().map(|t| t.purpose.as_str()).collect();
            log::debug!("  {}: {:?}", path, purposes);
        }
        plan
    }

    pub fn groups(&self) -> &IndexMap<String, Vec<ReplayTarget>> {
        &self.groups
    }

    pub fn click_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group key used for a page path: longest key that prefixes it, else an exact key
    pub fn match_path(&self, path: &str) -> Option<&str> {
        self.groups
            .keys()
            .filter(|key| path.starts_with(key.as_str()))
            .max_by_key(|key| key.len())
            .or_else(|| self.groups.get_key_value(path).map(|(key, _)| key))
            .map(String::as_str)
    }

    /// Targets the automaton would click on a page path
    pub fn targets_for(&self, path: &str) -> &[ReplayTarget] {
        self.match_path(path)
            .and_then(|key| self.groups.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Render the self-re-arming page script, injected to run on every new document
    pub fn to_script(&self, timing: &ReplayTiming) -> Result<String> {
        let steps = serde_json::to_string(&self.groups)?;

        Ok(REPLAY_TEMPLATE
            .replace("__CC_STEPS__", &steps)
            .replace("__CC_POLL_MS__", &timing.poll_interval_ms.to_string())
            .replace("__CC_MAX_ATTEMPTS__", &timing.max_attempts.to_string())
            .replace("__CC_SETTLE_MS__", &timing.settle_ms.to_string())
            .replace("__CC_ABANDON_MS__", &timing.abandon_ms.to_string())
            .replace("__CC_INITIAL_DELAY_MS__", &timing.initial_delay_ms.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ClickStep;

    fn click(purpose: StepPurpose, url_at: &str, text: &str) -> NavigationStep {
        NavigationStep::Click(ClickStep {
            selector: Some(format!("#{}", purpose.as_str())),
            text: text.to_string(),
            tag: "button".to_string(),
            aria_label: None,
            role: None,
            url_at: Some(url_at.to_string()),
            purpose,
        })
    }

    #[test]
    fn test_boundary_excludes_post_form_steps() {
        let steps = vec![
            click(StepPurpose::AddToCart, "https://shop.nl/products/x", "Add to cart"),
            click(StepPurpose::Continue, "https://shop.nl/checkout/address", "Continue"),
            click(StepPurpose::GoToCheckout, "https://shop.nl/cart", "Checkout"),
        ];

        let selected = select_pre_form_steps(&steps);
        assert_eq!(selected, vec![steps[0].clone()]);
    }

    #[test]
    fn test_continue_outside_checkout_is_kept() {
        let steps = vec![
            click(StepPurpose::Continue, "https://shop.nl/cart", "Verder"),
            click(StepPurpose::Confirm, "https://shop.nl/checkout/", "Bevestigen"),
            NavigationStep::Wait { seconds: 1.0 },
            click(StepPurpose::GuestCheckout, "https://shop.nl/login", "Als gast"),
        ];

        let selected = select_pre_form_steps(&steps);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|s| s.is_click()));
    }

    #[test]
    fn test_checkout_subpage_detection() {
        assert!(is_checkout_subpage("https://shop.nl/checkout/address"));
        assert!(is_checkout_subpage("/nl/checkout/summary?x=1"));
        assert!(!is_checkout_subpage("https://shop.nl/checkout/"));
        assert!(!is_checkout_subpage("https://shop.nl/checkouts/abc"));
    }

    #[test]
    fn test_compile_groups_by_path() {
        let steps = vec![
            click(StepPurpose::CookieConsent, "https://shop.nl/products/x?v=1", "Accept"),
            click(StepPurpose::AddToCart, "https://shop.nl/products/x", "Add to cart"),
            NavigationStep::Navigate { url: "https://shop.nl/cart".to_string() },
            click(StepPurpose::GoToCheckout, "https://shop.nl/cart", "Checkout"),
        ];

        let plan = ReplayPlan::compile(&steps, "https://shop.nl/products/x");
        assert_eq!(plan.click_count(), 3);
        let keys: Vec<&String> = plan.groups().keys().collect();
        assert_eq!(keys, vec!["/products/x", "/cart"]);
        assert_eq!(plan.targets_for("/products/x").len(), 2);
    }

    #[test]
    fn test_missing_url_falls_back_to_product_path() {
        let mut step = click(StepPurpose::AddToCart, "", "Kopen");
        if let NavigationStep::Click(c) = &mut step {
            c.url_at = None;
        }

        let plan = ReplayPlan::compile(&[step], "https://shop.nl/p/123");
        assert_eq!(plan.match_path("/p/123"), Some("/p/123"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let steps = vec![
            click(StepPurpose::CookieConsent, "https://shop.nl/", "Accept"),
            click(StepPurpose::GuestCheckout, "https://shop.nl/checkout", "Guest"),
            click(StepPurpose::SelectPayment, "https://shop.nl/checkout/payment", "Pay"),
        ];
        let plan = ReplayPlan::compile(&steps, "https://shop.nl/");

        assert_eq!(plan.match_path("/checkout/payment/step"), Some("/checkout/payment"));
        assert_eq!(plan.match_path("/checkout/login"), Some("/checkout"));
        assert_eq!(plan.match_path("/about"), Some("/"));
    }

    #[test]
    fn test_no_match() {
        let steps = vec![click(StepPurpose::AddToCart, "https://shop.nl/products/x", "Buy")];
        let plan = ReplayPlan::compile(&steps, "https://shop.nl/products/x");
        assert_eq!(plan.match_path("/cart"), None);
        assert!(plan.targets_for("/cart").is_empty());
    }

    #[test]
    fn test_targets_truncated() {
        let mut step = click(StepPurpose::AddToCart, "https://shop.nl/p", &"x".repeat(100));
        if let NavigationStep::Click(c) = &mut step {
            c.aria_label = Some("y".repeat(80));
        }
        let plan = ReplayPlan::compile(&[step], "https://shop.nl/p");
        let target = &plan.targets_for("/p")[0];
        assert_eq!(target.text.len(), 60);
        assert_eq!(target.aria_label.as_ref().map(String::len), Some(60));
    }

    #[test]
    fn test_script_embeds_plan_and_timing() {
        let steps = vec![click(StepPurpose::AddToCart, "https://shop.nl/p", "Add to cart")];
        let plan = ReplayPlan::compile(&steps, "https://shop.nl/p");
        let script = plan.to_script(&ReplayTiming::default()).unwrap();

        assert!(script.contains("window.__cc_replay_done"));
        assert!(script.contains(r##""/p":[{"selector":"#add_to_cart","text":"Add to cart","ariaLabel":null,"purpose":"add_to_cart"}]"##));
        assert!(script.contains("var MAX_ATTEMPTS = 12;"));
        assert!(script.contains("var SETTLE_MS = 1500;"));
        assert!(!script.contains("__CC_"));
    }
}
