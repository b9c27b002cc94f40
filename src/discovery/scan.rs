use crate::browser::{PageDriver, decode_script_result};
use crate::discovery::taxonomy::{classify_field, is_payment_field};
use crate::dom::{ElementNode, field_selector};
use crate::error::Result;
use crate::flow::SelectorSet;
use serde::{Deserialize, Serialize};

/// Lists visible, enabled, non-empty form controls
pub const SCAN_FIELDS_SCRIPT: &str = include_str!("scan_fields.js");
/// Checks that each candidate selector resolves to the scanned control
pub const RESOLVE_SELECTORS_SCRIPT: &str = include_str!("resolve_selectors.js");

/// Form and payment selectors learned from a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnedSelectors {
    pub form: SelectorSet,
    pub payment: SelectorSet,
}

impl LearnedSelectors {
    pub fn is_empty(&self) -> bool {
        self.form.is_empty() && self.payment.is_empty()
    }

    pub fn len(&self) -> usize {
        self.form.len() + self.payment.len()
    }

    /// File a selector under the bucket its field belongs to
    pub fn insert(&mut self, field: impl Into<String>, selector: impl Into<String>) {
        let field = field.into();
        let bucket = if is_payment_field(&field) { &mut self.payment } else { &mut self.form };
        bucket.insert(field, selector.into());
    }
}

/// A control reported by the scan script
#[derive(Debug, Clone, Deserialize)]
struct ScannedControl {
    /// Position in `document.querySelectorAll('input, select, textarea')`
    index: usize,
    #[serde(flatten)]
    element: ElementNode,
}

#[derive(Debug, Serialize)]
struct Candidate<'a> {
    index: usize,
    selector: &'a str,
}

/// Classify and select every filled control on the current page.
///
/// Later controls win for the same field.
pub fn scan_page(driver: &dyn PageDriver) -> Result<LearnedSelectors> {
    let controls: Vec<ScannedControl> = decode_script_result(driver.evaluate(SCAN_FIELDS_SCRIPT, None)?)?;

    let classified: Vec<(&'static str, usize, String)> = controls
        .iter()
        .filter_map(|control| {
            let field = classify_field(&control.element)?;
            let selector = field_selector(&control.element)?;
            Some((field, control.index, selector))
        })
        .collect();

    if classified.is_empty() {
        log::debug!("Page scan: {} controls, none classified", controls.len());
        return Ok(LearnedSelectors::default());
    }

    let candidates: Vec<Candidate<'_>> = classified
        .iter()
        .map(|(_, index, selector)| Candidate { index: *index, selector })
        .collect();
    let args = serde_json::json!({ "candidates": candidates });
    let resolves: Vec<bool> = decode_script_result(driver.evaluate(RESOLVE_SELECTORS_SCRIPT, Some(&args))?)?;

    let mut learned = LearnedSelectors::default();
    for ((field, _, selector), ok) in classified.iter().zip(resolves) {
        if ok {
            learned.insert(*field, selector.as_str());
        } else {
            log::debug!("Selector '{}' for '{}' does not resolve to its control", selector, field);
        }
    }

    log::info!(
        "Page scan: {} controls, {} form and {} payment selectors",
        controls.len(),
        learned.form.len(),
        learned.payment.len()
    );
    Ok(learned)
}

/// Tool-reported selectors win; the scan only fills fields they left out
pub fn reconcile(reported: &LearnedSelectors, scanned: &LearnedSelectors) -> LearnedSelectors {
    let mut merged = reported.clone();

    for (field, selector) in scanned.form.iter().chain(scanned.payment.iter()) {
        let known = merged.form.contains_key(field) || merged.payment.contains_key(field);
        if !known {
            merged.insert(field.as_str(), selector.as_str());
        }
    }
    merged
}
