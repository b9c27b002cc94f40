//! Blind replay of a cached checkout prefix
//!
//! Cached click steps are compiled into a page script registered to run on every new
//! document. On each load it picks the step group for the current path and clicks
//! through it, so a chain of navigations replays without the agent.

pub mod compiler;

pub use compiler::{ReplayPlan, ReplayTarget, select_pre_form_steps};

use crate::browser::PageDriver;
use crate::config::ReplayTiming;
use crate::error::Result;
use crate::flow::FlowRecord;

/// Auto-dismisses cookie banners and overlays on every page load
pub const POPUP_DISMISS_SCRIPT: &str = include_str!("popup.js");

/// Register the popup dismiss script for the rest of the session
pub fn install_popup_dismiss(driver: &dyn PageDriver) -> Result<()> {
    driver.add_init_script(POPUP_DISMISS_SCRIPT)?;
    log::info!("Popup auto-dismiss installed");
    Ok(())
}

/// Register the replay automaton for `plan`; returns the number of clicks armed
pub fn install_replay(driver: &dyn PageDriver, plan: &ReplayPlan, timing: &ReplayTiming) -> Result<usize> {
    if plan.is_empty() {
        return Ok(0);
    }

    let script = plan.to_script(timing)?;
    driver.add_init_script(&script)?;

    log::info!(
        "Replay script installed: {} clicks over {} pages (max {}ms per click)",
        plan.click_count(),
        plan.groups().len(),
        timing.step_timeout_ms()
    );
    Ok(plan.click_count())
}

/// Plan for the replayable prefix of a stored flow.
/// Clicks without a page URL are attributed to `product_url`, else the domain root.
pub fn plan_for_flow(record: &FlowRecord, product_url: Option<&str>) -> ReplayPlan {
    let root = format!("https://{}/", record.domain);
    let steps = select_pre_form_steps(&record.navigation_steps);
    ReplayPlan::compile(&steps, product_url.unwrap_or(&root))
}
