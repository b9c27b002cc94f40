use crate::browser::{PageDriver, decode_script_result};
use crate::error::Result;
use crate::flow::SelectorSet;
use serde::{Deserialize, Serialize};

pub const CHECK_SELECTORS_SCRIPT: &str = include_str!("check_selectors.js");

/// Which saved selectors still resolve to a displayed element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorLiveness {
    pub alive_fields: Vec<String>,
    pub dead_fields: Vec<String>,
}

impl SelectorLiveness {
    pub fn alive(&self) -> usize {
        self.alive_fields.len()
    }

    pub fn dead(&self) -> usize {
        self.dead_fields.len()
    }

    pub fn total(&self) -> usize {
        self.alive() + self.dead()
    }

    /// Share of alive selectors in percent; 0 when nothing was checked
    pub fn health_pct(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.alive() as f64 / self.total() as f64 * 100.0
    }
}

/// Check saved selectors against the current page
pub fn check_selectors(driver: &dyn PageDriver, selectors: &SelectorSet) -> Result<SelectorLiveness> {
    if selectors.is_empty() {
        return Ok(SelectorLiveness::default());
    }

    let args = serde_json::json!({ "selectors": selectors });
    let liveness: SelectorLiveness = decode_script_result(driver.evaluate(CHECK_SELECTORS_SCRIPT, Some(&args))?)?;

    log::info!(
        "Selector check: {}/{} alive ({:.0}%)",
        liveness.alive(),
        liveness.total(),
        liveness.health_pct()
    );
    if !liveness.dead_fields.is_empty() {
        log::debug!("Dead selectors: {:?}", liveness.dead_fields);
    }
    Ok(liveness)
}
