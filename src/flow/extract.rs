//! Canonicalize an agent's raw action trace into replayable navigation steps.
//!
//! Only navigation survives: clicks on buttons and links, explicit navigations, short
//! waits and history steps. Form input is replayed by the fill engine from saved
//! selectors, never by re-typing recorded keystrokes.

use crate::dom::{ElementNode, navigation_selector};
use crate::flow::record::{ClickStep, NavigationStep, StepPurpose};
use crate::tools::ToolKind;
use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest recorded click text / aria-label
const MAX_TEXT_LEN: usize = 100;
/// Waits longer than this are cut down on replay
const MAX_WAIT_SECONDS: f64 = 2.0;
/// Text prefix length used for de-duplication
const DEDUP_TEXT_LEN: usize = 20;

/// Purpose keywords in priority order; the first table with a hit wins
const PURPOSE_KEYWORDS: &[(StepPurpose, &[&str])] = &[
    (StepPurpose::CookieConsent, &["accept", "accepteren", "cookie", "consent", "agree"]),
    (
        StepPurpose::AddToCart,
        &["add to cart", "in winkelwagen", "bestellen", "buy", "kopen", "wil bestellen"],
    ),
    (
        StepPurpose::GoToCheckout,
        &["checkout", "kassa", "winkelwagen", "cart", "verder naar bestellen", "ga bestellen"],
    ),
    (
        StepPurpose::GuestCheckout,
        &["guest", "zonder registratie", "zonder account", "continue without"],
    ),
    (StepPurpose::Continue, &["verder", "continue", "next", "doorgaan", "volgende"]),
    (StepPurpose::Confirm, &["bevestigen", "confirm", "accept"]),
    (StepPurpose::ClosePopup, &["close", "sluiten", "dismiss", "×"]),
    (StepPurpose::SelectPayment, &["creditcard", "credit card", "betalen", "pay"]),
];

/// One action the exploring agent took
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AgentAction {
    Click {
        #[serde(default)]
        element: Option<ElementNode>,
    },
    Navigate {
        url: String,
    },
    Wait {
        #[serde(default)]
        seconds: Option<f64>,
    },
    GoBack {},
    Input {
        #[serde(default)]
        element: Option<ElementNode>,
        #[serde(default)]
        text: String,
    },
    /// Invocation of one of our custom tools
    Tool {
        tool: ToolKind,
    },
}

/// An action together with the page URL it was taken on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    #[serde(flatten)]
    pub action: AgentAction,

    #[serde(default)]
    pub url: Option<String>,
}

impl TraceEntry {
    pub fn new(action: AgentAction, url: Option<String>) -> Self {
        Self { action, url }
    }
}

/// Classify a click by multilingual keyword match on its text
pub fn classify_purpose(text: &str) -> StepPurpose {
    let lower = text.to_lowercase();
    PURPOSE_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(purpose, _)| *purpose)
        .unwrap_or(StepPurpose::Other)
}

/// Build a click step from the clicked element
pub fn click_step(element: &ElementNode, url_at: Option<&str>) -> ClickStep {
    let text = truncate_chars(element.text().trim(), MAX_TEXT_LEN);

    ClickStep {
        selector: navigation_selector(element),
        purpose: classify_purpose(&text),
        text,
        tag: element.tag(),
        aria_label: element.get_attribute("aria-label").map(|l| truncate_chars(l, MAX_TEXT_LEN)),
        role: element.get_attribute("role").map(str::to_string),
        url_at: url_at.map(str::to_string),
    }
}

/// Turn an ordered trace into ordered navigation steps
pub fn extract_navigation_steps(trace: &[TraceEntry]) -> Vec<NavigationStep> {
    let mut steps = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for entry in trace {
        match &entry.action {
            AgentAction::Tool { .. } | AgentAction::Input { .. } => continue,

            AgentAction::Click { element } => {
                let Some(element) = element else {
                    continue;
                };

                let step = click_step(element, entry.url.as_deref());
                if !is_navigation_click(&step) {
                    continue;
                }

                let key = (
                    step.selector.clone().unwrap_or_default(),
                    truncate_chars(&step.text, DEDUP_TEXT_LEN),
                );
                if !seen.insert(key) {
                    continue;
                }

                steps.push(NavigationStep::Click(step));
            }

            AgentAction::Navigate { url } => {
                if !url.is_empty() {
                    steps.push(NavigationStep::Navigate { url: url.clone() });
                }
            }

            AgentAction::Wait { seconds } => {
                let seconds = seconds.unwrap_or(MAX_WAIT_SECONDS).clamp(0.0, MAX_WAIT_SECONDS);
                steps.push(NavigationStep::Wait { seconds });
            }

            AgentAction::GoBack {} => steps.push(NavigationStep::GoBack {}),
        }
    }

    log::info!("Extracted {} navigation steps from {} trace entries", steps.len(), trace.len());
    steps
}

fn is_navigation_click(step: &ClickStep) -> bool {
    let purposeless = step.purpose == StepPurpose::Other;

    if step.text.is_empty() && purposeless {
        return false;
    }
    // Decorative wrappers
    if step.tag == "span" && purposeless {
        return false;
    }
    !matches!(step.tag.as_str(), "input" | "textarea" | "select")
}
