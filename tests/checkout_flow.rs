//! Learn-then-replay runs against an in-memory shop page

use checkout_replay::checkout::{
    AgentHistory, AgentTask, CheckoutAgent, CheckoutRequest, DecisionType, ShippingAddress,
};
use checkout_replay::discovery::platform::DETECT_PLATFORM_SCRIPT;
use checkout_replay::dom::ElementNode;
use checkout_replay::fill::{FIELD_OP_SCRIPT, FillEngine};
use checkout_replay::flow::{AgentAction, NavigationStep, Platform, TraceEntry};
use checkout_replay::replay::POPUP_DISMISS_SCRIPT;
use checkout_replay::tools::{ToolKind, ToolResult, ToolSession};
use checkout_replay::{CheckoutConfig, CheckoutError, CheckoutRunner, PageDriver, Result};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashSet;
use tempfile::TempDir;

const PRODUCT_URL: &str = "https://www.shop.nl/products/mug";

/// Checkout page with an echoing email input, on a Shopify store
struct ShopPage {
    controls: HashSet<String>,
    init_scripts: RefCell<Vec<String>>,
    rejects_init_scripts: bool,
}

impl ShopPage {
    fn new() -> Self {
        Self {
            controls: ["#email".to_string()].into_iter().collect(),
            init_scripts: RefCell::new(Vec::new()),
            rejects_init_scripts: false,
        }
    }

    /// Page whose CDP session refuses new-document scripts
    fn rejecting_init_scripts() -> Self {
        Self { rejects_init_scripts: true, ..Self::new() }
    }
}

impl PageDriver for ShopPage {
    fn evaluate(&self, script: &str, args: Option<&Value>) -> Result<Value> {
        if script == DETECT_PLATFORM_SCRIPT {
            return Ok(Value::String("\"shopify\"".to_string()));
        }
        if script != FIELD_OP_SCRIPT {
            return Err(CheckoutError::EvaluationFailed("not supported by this page".to_string()));
        }

        let args = args.cloned().unwrap_or(Value::Null);
        let selector = args["selector"].as_str().unwrap_or_default();
        let found = self.controls.contains(selector);
        let response = match args["op"].as_str() {
            Some("write") if found => json!({"found": true, "isSelect": false, "actual": args["value"]}),
            _ => json!({"found": found, "isSelect": false}),
        };
        Ok(Value::String(response.to_string()))
    }

    fn current_url(&self) -> Result<String> {
        Ok("https://shop.nl/checkout/contact".to_string())
    }

    fn add_init_script(&self, script: &str) -> Result<()> {
        if self.rejects_init_scripts {
            return Err(CheckoutError::EvaluationFailed("target closed".to_string()));
        }
        self.init_scripts.borrow_mut().push(script.to_string());
        Ok(())
    }
}

/// Agent that replays a fixed list of tool calls and reports a fixed trace
#[derive(Default)]
struct ScriptedAgent {
    calls: Vec<(&'static str, Value)>,
    trace: Vec<TraceEntry>,
    final_result: Option<String>,
    is_done: bool,
    error: Option<String>,
    tasks: Vec<AgentTask>,
    results: Vec<ToolResult>,
}

impl CheckoutAgent for ScriptedAgent {
    fn run(&mut self, task: &AgentTask, tools: &mut ToolSession<'_>) -> Result<AgentHistory> {
        self.tasks.push(task.clone());
        if let Some(error) = &self.error {
            return Err(CheckoutError::AgentFailed(error.clone()));
        }

        for (name, params) in &self.calls {
            let result = tools.call(name, params.clone())?;
            self.results.push(result);
        }

        Ok(AgentHistory {
            trace: self.trace.clone(),
            final_result: self.final_result.clone(),
            is_done: self.is_done,
        })
    }
}

fn click(id: &str, tag: &str, text: &str, url: &str) -> TraceEntry {
    let element = ElementNode::new(tag).with_attribute("id", id).with_text(text);
    TraceEntry::new(AgentAction::Click { element: Some(element) }, Some(url.to_string()))
}

fn click_texts(steps: &[NavigationStep]) -> Vec<String> {
    steps.iter().filter_map(NavigationStep::as_click).map(|click| click.text.clone()).collect()
}

fn tool(kind: ToolKind) -> TraceEntry {
    TraceEntry::new(AgentAction::Tool { tool: kind }, Some("https://shop.nl/checkout/contact".to_string()))
}

fn request() -> CheckoutRequest {
    let mut request = CheckoutRequest::new(PRODUCT_URL);
    request.email = "jan@example.nl".to_string();
    request.shipping = ShippingAddress {
        full_name: "Jan de Vries".to_string(),
        street: "Damrak 1".to_string(),
        city: "Amsterdam".to_string(),
        zip_code: "1012 LG".to_string(),
        country: "NL".to_string(),
        ..Default::default()
    };
    request
}

fn learning_agent() -> ScriptedAgent {
    ScriptedAgent {
        calls: vec![("fill_shipping_form", json!({}))],
        trace: vec![
            click("add", "button", "Add to cart", "https://shop.nl/products/mug"),
            click("to-checkout", "a", "Checkout", "https://shop.nl/cart"),
            tool(ToolKind::FillShippingForm),
            click("continue", "button", "Continue", "https://shop.nl/checkout/contact"),
        ],
        final_result: Some("Reached the review page. DRY_RUN_COMPLETE".to_string()),
        ..Default::default()
    }
}

fn runner<'a>(dir: &TempDir, page: &'a ShopPage) -> CheckoutRunner<'a> {
    CheckoutRunner::new(CheckoutConfig::new().flows_dir(dir.path()), page).fill_engine(FillEngine::new().pacing(0, 0))
}

#[test]
fn test_first_visit_learns_flow() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);

    let mut agent = learning_agent();
    let result = runner.run(&mut agent, &request());

    assert!(result.success, "{:?}", result.error);
    assert!(result.dry_run);
    assert_eq!(result.replay_steps_used, 0);
    assert_eq!(result.llm_steps, 4);
    assert_eq!(result.final_url.as_deref(), Some("https://shop.nl/checkout/contact"));

    let task = &agent.tasks[0];
    assert_eq!(task.start_url, PRODUCT_URL);
    assert_eq!(task.max_steps, 50);
    assert!(agent.results[0].success);

    let learned = result.learned_selectors.unwrap();
    assert_eq!(learned.form.get("email").map(String::as_str), Some("#email"));

    let flow = runner.store().load("shop.nl").unwrap();
    assert_eq!(flow.success_count, 1);
    assert_eq!(flow.platform, Platform::Shopify);
    assert_eq!(flow.checkout_url_pattern.as_deref(), Some("/checkout/"));
    assert_eq!(flow.navigation_steps.len(), 3);
    assert_eq!(flow.click_count(), 3);

    // Only the popup script; nothing to replay yet
    assert_eq!(*page.init_scripts.borrow(), vec![POPUP_DISMISS_SCRIPT.to_string()]);
}

#[test]
fn test_second_visit_replays_pre_form_clicks() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);
    runner.run(&mut learning_agent(), &request());

    let replay_page = ShopPage::new();
    let runner = self::runner(&dir, &replay_page);
    let mut agent = ScriptedAgent {
        calls: vec![("fill_shipping_form", json!({}))],
        trace: vec![
            tool(ToolKind::FillShippingForm),
            click("continue", "button", "Continue", "https://shop.nl/checkout/contact"),
        ],
        final_result: Some("DRY_RUN_COMPLETE".to_string()),
        ..Default::default()
    };
    let result = runner.run(&mut agent, &request());

    assert!(result.success);
    assert_eq!(result.replay_steps_used, 2);
    assert_eq!(agent.tasks[0].max_steps, 30);

    let scripts = replay_page.init_scripts.borrow();
    assert_eq!(scripts.len(), 2);
    assert!(scripts[1].contains("Add to cart"));
    assert!(!scripts[1].contains("Continue"));

    let data = agent.results[0].data.as_ref().unwrap();
    assert_eq!(data["from_saved"], 1);

    // Replayed prefix plus what the agent did after it
    let flow = runner.store().load("shop.nl").unwrap();
    assert_eq!(flow.success_count, 2);
    assert_eq!(flow.navigation_steps.len(), 3);
}

#[test]
fn test_unarmed_replay_saves_agent_steps_only() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    runner(&dir, &page).run(&mut learning_agent(), &request());

    // Replay cannot be installed, so the agent walks the whole path again
    let broken_page = ShopPage::rejecting_init_scripts();
    let runner = self::runner(&dir, &broken_page);
    let mut agent = learning_agent();
    let result = runner.run(&mut agent, &request());

    assert!(result.success);
    assert_eq!(result.replay_steps_used, 0);
    assert_eq!(agent.tasks[0].max_steps, 50);

    let flow = runner.store().load("shop.nl").unwrap();
    assert_eq!(flow.success_count, 2);
    assert_eq!(click_texts(&flow.navigation_steps), vec!["Add to cart", "Checkout", "Continue"]);
}

#[test]
fn test_unfinished_run_records_failure() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);
    runner.run(&mut learning_agent(), &request());

    let mut agent = ScriptedAgent {
        trace: vec![click("add", "button", "Add to cart", "https://shop.nl/products/mug")],
        final_result: Some("Could not find the checkout button".to_string()),
        ..Default::default()
    };
    let result = runner.run(&mut agent, &request());

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Could not find the checkout button"));
    assert!(result.learned_selectors.is_none());

    let flow = runner.store().load("shop.nl").unwrap();
    assert_eq!(flow.success_count, 1);
    assert_eq!(flow.failure_count, 1);
    assert_eq!(flow.consecutive_failures, 1);
    assert_eq!(flow.last_error.as_deref(), Some("Could not find the checkout button"));
}

#[test]
fn test_agent_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);
    runner.run(&mut learning_agent(), &request());

    let mut agent = ScriptedAgent { error: Some("model unavailable".to_string()), ..Default::default() };
    let result = runner.run(&mut agent, &request());

    assert!(!result.success);
    assert!(result.error.unwrap().contains("model unavailable"));
    assert_eq!(result.llm_steps, 0);
    assert_eq!(runner.store().load("shop.nl").unwrap().consecutive_failures, 1);
}

#[test]
fn test_long_errors_are_truncated() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);
    runner.run(&mut learning_agent(), &request());

    let mut agent = ScriptedAgent {
        final_result: Some("Stuck on the shipping page. ".repeat(20)),
        ..Default::default()
    };
    let result = runner.run(&mut agent, &request());
    assert_eq!(result.error.unwrap().chars().count(), 200);

    let mut agent = ScriptedAgent { error: Some("x".repeat(500)), ..Default::default() };
    let result = runner.run(&mut agent, &request());
    assert_eq!(result.error.unwrap().chars().count(), 200);

    let flow = runner.store().load("shop.nl").unwrap();
    assert_eq!(flow.consecutive_failures, 2);
    assert_eq!(flow.last_error.unwrap().chars().count(), 200);
}

#[test]
fn test_agent_without_history_leaves_store_alone() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);

    let mut agent = ScriptedAgent::default();
    let result = runner.run(&mut agent, &request());

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Agent did not complete checkout"));
    assert!(runner.store().load("shop.nl").is_none());
}

#[test]
fn test_decision_points_surface() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);

    let mut agent = ScriptedAgent {
        calls: vec![(
            "report_decision_needed",
            json!({
                "decision_type": "variant_unavailable",
                "message": "Size M is sold out",
                "options": "S, L, XL"
            }),
        )],
        trace: vec![tool(ToolKind::ReportDecisionNeeded)],
        final_result: Some("DECISION_NEEDED: size M is sold out".to_string()),
        is_done: true,
        ..Default::default()
    };
    let result = runner.run(&mut agent, &request());

    assert!(result.success);
    assert!(result.decision_needed);
    assert_eq!(result.decision_points.len(), 1);
    assert_eq!(result.decision_points[0].kind, DecisionType::VariantUnavailable);
    assert_eq!(result.decision_points[0].options, vec!["S", "L", "XL"]);
}

#[test]
fn test_unknown_tool_fails_run() {
    let dir = TempDir::new().unwrap();
    let page = ShopPage::new();
    let runner = runner(&dir, &page);

    let mut agent = ScriptedAgent { calls: vec![("take_screenshot", json!({}))], ..Default::default() };
    let result = runner.run(&mut agent, &request());

    assert!(!result.success);
    assert!(result.error.unwrap().contains("take_screenshot"));
}
