use crate::browser::PageDriver;
use crate::checkout::agent::{AgentTask, CheckoutAgent};
use crate::checkout::prompt::{Visit, task_prompt};
use crate::checkout::request::{CheckoutRequest, CheckoutResult, DECISION_NEEDED, DRY_RUN_COMPLETE};
use crate::config::CheckoutConfig;
use crate::discovery::{LearnedSelectors, checkout_url_pattern, detect_platform, discover};
use crate::fill::FillEngine;
use crate::flow::store::MAX_ERROR_LEN;
use crate::flow::{FlowStore, FlowUpdate, NavigationStep, evaluate, extract_navigation_steps};
use crate::replay::{ReplayPlan, install_popup_dismiss, install_replay, select_pre_form_steps};
use crate::tools::{CheckoutState, ToolContext, ToolRegistry, ToolSession};
use crate::utils::truncate_chars;
use std::time::Instant;

/// Error recorded when the agent stops without a final message
const DEFAULT_FAILURE: &str = "Agent did not complete checkout";
/// Actions the agent may batch per step
const MAX_ACTIONS_PER_STEP: u32 = 5;

/// What a stored flow contributes to a run
#[derive(Debug, Default)]
struct Knowledge {
    seeds: LearnedSelectors,
    navigation_steps: Vec<NavigationStep>,
}

/// Runs checkouts on one page, replaying and updating learned flows
pub struct CheckoutRunner<'a> {
    config: CheckoutConfig,
    driver: &'a dyn PageDriver,
    store: FlowStore,
    engine: FillEngine,
}

impl<'a> CheckoutRunner<'a> {
    pub fn new(config: CheckoutConfig, driver: &'a dyn PageDriver) -> Self {
        let store = FlowStore::new(config.flows_dir.clone());
        Self { config, driver, store, engine: FillEngine::new() }
    }

    /// Replace the fill engine handed to the form tools
    pub fn fill_engine(mut self, engine: FillEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn store(&self) -> &FlowStore {
        &self.store
    }

    /// Run one checkout. Never fails: every problem ends up in the result.
    pub fn run(&self, agent: &mut dyn CheckoutAgent, request: &CheckoutRequest) -> CheckoutResult {
        let started = Instant::now();
        log::info!("Starting checkout: {} (dry run: {})", request.product_url, request.dry_run);

        let knowledge = self.load_knowledge(request);

        if self.config.dismiss_popups {
            if let Err(e) = install_popup_dismiss(self.driver) {
                log::warn!("Could not install popup dismiss script: {}", e);
            }
        }

        let pre_form = select_pre_form_steps(&knowledge.navigation_steps);
        let replay_steps_used = self.arm_replay(&pre_form, request);
        let task = self.build_task(request, &knowledge, replay_steps_used);

        let state = CheckoutState::new(request, knowledge.seeds).with_engine(self.engine.clone());
        let mut session = ToolSession::new(ToolRegistry::with_defaults(), ToolContext::new(self.driver, state));

        log::info!("Running agent (max {} steps)", task.max_steps);
        let history = match agent.run(&task, &mut session) {
            Ok(history) => history,
            Err(e) => {
                log::error!("Checkout failed: {}", e);
                let error = e.to_string();
                self.store.record_failure(&request.product_url, Some(&error));
                return CheckoutResult::failed(
                    truncate_chars(&error, MAX_ERROR_LEN),
                    request.dry_run,
                    elapsed_ms(started),
                );
            }
        };
        let state = session.into_state();

        let final_url = self.driver.current_url().ok();
        let final_text = history.final_text();
        let dry_run_complete = request.dry_run && final_text.contains(DRY_RUN_COMPLETE);
        let decision_needed = final_text.contains(DECISION_NEEDED);
        let success = history.is_done || dry_run_complete;

        let mut result = CheckoutResult {
            success,
            error: None,
            final_url: final_url.clone(),
            execution_ms: elapsed_ms(started),
            llm_steps: history.steps(),
            dry_run: request.dry_run,
            learned_selectors: None,
            replay_steps_used,
            decision_needed,
            decision_points: state.decision_points,
        };
        log::info!(
            "Agent finished in {}ms: {} replayed + {} agent steps (success: {})",
            result.execution_ms,
            replay_steps_used,
            result.llm_steps,
            success
        );

        if !success {
            let error = history.final_result.clone().unwrap_or_else(|| DEFAULT_FAILURE.to_string());
            self.store.record_failure(&request.product_url, Some(&error));
            result.error = Some(truncate_chars(&error, MAX_ERROR_LEN));
            return result;
        }

        // The agent walked the prefix itself unless the replay script was armed
        let mut steps = if replay_steps_used > 0 { pre_form } else { Vec::new() };
        steps.extend(extract_navigation_steps(&history.trace));
        result.learned_selectors = Some(self.learn(request, final_url.as_deref(), &state.fill_results, steps));
        result
    }

    fn load_knowledge(&self, request: &CheckoutRequest) -> Knowledge {
        let mut knowledge = Knowledge::default();

        if let Some(flow) = self.store.load(&request.product_url) {
            let health = evaluate(&flow);
            log::info!(
                "Flow health: {} (success rate {:.1}%, consecutive failures {})",
                health.status,
                health.success_rate,
                health.consecutive_failures
            );

            knowledge.seeds.form = flow.form_selectors;
            knowledge.seeds.payment = flow.payment_selectors;
            if health.needs_relearn {
                log::info!("Flow needs re-learning, ignoring cached navigation");
            } else {
                knowledge.navigation_steps = flow.navigation_steps;
            }
        }

        // Request seeds win over stored selectors
        if let Some(form) = &request.saved_form_selectors {
            knowledge.seeds.form.extend(form.clone());
        }
        if let Some(payment) = &request.saved_payment_selectors {
            knowledge.seeds.payment.extend(payment.clone());
        }

        if !knowledge.navigation_steps.is_empty() {
            log::info!(
                "{} cached nav steps, {} form and {} payment selectors",
                knowledge.navigation_steps.len(),
                knowledge.seeds.form.len(),
                knowledge.seeds.payment.len()
            );
        } else if !knowledge.seeds.form.is_empty() {
            log::info!("{} cached form selectors, no nav steps yet", knowledge.seeds.form.len());
        } else {
            log::info!("Nothing cached, learning on this visit");
        }
        knowledge
    }

    /// Install the replay script for the cached prefix; returns the clicks armed
    fn arm_replay(&self, pre_form: &[NavigationStep], request: &CheckoutRequest) -> usize {
        if !pre_form.iter().any(NavigationStep::is_click) {
            return 0;
        }

        let plan = ReplayPlan::compile(pre_form, &request.product_url);
        match install_replay(self.driver, &plan, &self.config.replay_timing) {
            Ok(clicks) => clicks,
            Err(e) => {
                log::warn!("Could not install replay script: {}", e);
                0
            }
        }
    }

    fn build_task(&self, request: &CheckoutRequest, knowledge: &Knowledge, replay_steps_used: usize) -> AgentTask {
        let (visit, max_steps) = if replay_steps_used > 0 {
            (Visit::Replay, request.max_steps.min(self.config.replay_max_steps))
        } else {
            (Visit::Learning { saved_selectors: knowledge.seeds.form.len() }, request.max_steps)
        };

        AgentTask {
            prompt: task_prompt(request, visit),
            start_url: request.product_url.clone(),
            max_steps,
            max_actions_per_step: MAX_ACTIONS_PER_STEP,
        }
    }

    /// Discover selectors on the final page and save the flow
    fn learn(
        &self,
        request: &CheckoutRequest,
        final_url: Option<&str>,
        reported: &LearnedSelectors,
        steps: Vec<NavigationStep>,
    ) -> LearnedSelectors {
        let learned = discover(self.driver, reported);

        if learned.is_empty() && steps.is_empty() {
            log::info!("Nothing learned on this visit");
            return learned;
        }

        let mut update = FlowUpdate::new()
            .form_selectors(learned.form.clone())
            .payment_selectors(learned.payment.clone())
            .navigation_steps(steps)
            .platform(detect_platform(self.driver));
        if let Some(pattern) = final_url.and_then(checkout_url_pattern) {
            update = update.checkout_url_pattern(pattern);
        }
        if let Some(url) = final_url {
            update = update.final_url(url);
        }

        self.store.save(&request.product_url, update);
        learned
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
