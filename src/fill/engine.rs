use crate::browser::{PageDriver, decode_script_result};
use crate::error::Result;
use crate::fill::fields::FieldDescriptor;
use crate::flow::SelectorSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Page-side field operations (probe, choose option, write with a strategy)
pub const FIELD_OP_SCRIPT: &str = include_str!("field_op.js");

/// How a value is written into a text control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStrategy {
    /// Prototype value setter plus input/change/blur
    NativeSetter,
    /// Plain assignment plus input/change
    DirectAssign,
    /// `document.execCommand('insertText')`
    InsertText,
}

impl WriteStrategy {
    /// Attempt order; one initial attempt and two retries
    pub const LADDER: [WriteStrategy; 3] = [Self::NativeSetter, Self::DirectAssign, Self::InsertText];
}

/// Command sent to [`FIELD_OP_SCRIPT`]
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum FieldOp<'a> {
    Probe { selector: &'a str },
    Select { selector: &'a str, candidates: Vec<&'a str> },
    Write { selector: &'a str, value: &'a str, strategy: WriteStrategy },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FieldOpResult {
    found: bool,
    is_select: bool,
    selected: Option<String>,
    actual: Option<String>,
    error: Option<String>,
}

/// Aggregate outcome of one fill pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillReport {
    pub filled: Vec<String>,
    pub missed: Vec<String>,

    /// Text fields whose read-back matched
    pub verified: Vec<String>,

    /// Fields that needed more than the first strategy
    pub retried: Vec<String>,

    pub total: usize,

    /// Field name → selector that worked
    pub used_selectors: SelectorSet,
}

impl FillReport {
    /// One-line summary handed back to the agent
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Filled {}/{} fields. Verified: {}/{}.",
            self.filled.len(),
            self.total,
            self.verified.len(),
            self.filled.len()
        );
        if !self.filled.is_empty() {
            summary.push_str(&format!("\nFilled: {}", self.filled.join(", ")));
        }
        if !self.retried.is_empty() {
            summary.push_str(&format!("\nRequired retry: {}", self.retried.join(", ")));
        }
        if !self.missed.is_empty() {
            summary.push_str(&format!("\nMissed (fill manually): {}", self.missed.join(", ")));
        }
        summary
    }
}

struct FieldOutcome {
    selector: String,
    verified: bool,
    retried: bool,
}

/// Compare a written value with what the control reads back.
///
/// Both sides are trimmed. Besides an exact match, a match ignoring whitespace,
/// hyphens and parentheses is accepted, since masks reformat phone numbers.
pub fn values_match(expected: &str, actual: &str) -> bool {
    let expected = expected.trim();
    let actual = actual.trim();

    if expected.is_empty() || actual == expected {
        return true;
    }

    let strip = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
            .collect()
    };
    strip(actual) == strip(expected)
}

/// Sequential, human-paced form filler with read-back verification
#[derive(Debug, Clone)]
pub struct FillEngine {
    min_pause_ms: u64,
    max_pause_ms: u64,
}

impl Default for FillEngine {
    fn default() -> Self {
        Self { min_pause_ms: 100, max_pause_ms: 300 }
    }
}

impl FillEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Random pause range between fields; `(0, 0)` disables pacing
    pub fn pacing(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_pause_ms = min_ms;
        self.max_pause_ms = max_ms.max(min_ms);
        self
    }

    /// Fill the fields one by one, in order
    pub fn fill(&self, driver: &dyn PageDriver, fields: &[FieldDescriptor]) -> FillReport {
        let mut report = FillReport { total: fields.len(), ..Default::default() };

        for (idx, field) in fields.iter().enumerate() {
            if idx > 0 {
                self.pause();
            }

            if !field.has_value() {
                log::debug!("Field '{}' has no value, skipping", field.name);
                report.missed.push(field.name.clone());
                continue;
            }

            match self.fill_field(driver, field) {
                Some(outcome) => {
                    report.filled.push(field.name.clone());
                    if outcome.verified {
                        report.verified.push(field.name.clone());
                    }
                    if outcome.retried {
                        report.retried.push(field.name.clone());
                    }
                    report.used_selectors.insert(field.name.clone(), outcome.selector);
                }
                None => report.missed.push(field.name.clone()),
            }
        }

        log::info!(
            "Form fill: {}/{} filled ({} verified, {} retried)",
            report.filled.len(),
            report.total,
            report.verified.len(),
            report.retried.len()
        );
        report
    }

    fn fill_field(&self, driver: &dyn PageDriver, field: &FieldDescriptor) -> Option<FieldOutcome> {
        for selector in &field.selectors {
            let probe = match run_op(driver, &FieldOp::Probe { selector }) {
                Ok(probe) => probe,
                Err(e) => {
                    log::debug!("Probe of '{}' for '{}' failed: {}", selector, field.name, e);
                    continue;
                }
            };
            if !probe.found {
                continue;
            }

            // Option-list fields are never typed into, whatever control the selector hits
            let outcome = if field.is_select || probe.is_select {
                choose_option(driver, selector, field)
            } else {
                write_verified(driver, selector, field)
            };
            if outcome.is_some() {
                return outcome;
            }
        }
        None
    }

    fn pause(&self) {
        if self.max_pause_ms == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(self.min_pause_ms..=self.max_pause_ms);
        thread::sleep(Duration::from_millis(ms));
    }
}

fn run_op(driver: &dyn PageDriver, op: &FieldOp<'_>) -> Result<FieldOpResult> {
    let args = serde_json::to_value(op)?;
    let value = driver.evaluate(FIELD_OP_SCRIPT, Some(&args))?;
    decode_script_result(value)
}

fn choose_option(driver: &dyn PageDriver, selector: &str, field: &FieldDescriptor) -> Option<FieldOutcome> {
    let candidates: Vec<&str> = field
        .select_code
        .as_deref()
        .into_iter()
        .chain(std::iter::once(field.value.as_str()))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    match run_op(driver, &FieldOp::Select { selector, candidates }) {
        Ok(result) if result.selected.is_some() => Some(FieldOutcome {
            selector: selector.to_string(),
            verified: false,
            retried: false,
        }),
        Ok(_) => {
            log::debug!("No option of '{}' matches '{}'", selector, field.value);
            None
        }
        Err(e) => {
            log::debug!("Select on '{}' failed: {}", selector, e);
            None
        }
    }
}

fn write_verified(driver: &dyn PageDriver, selector: &str, field: &FieldDescriptor) -> Option<FieldOutcome> {
    if field.value.trim().is_empty() {
        return None;
    }

    for (attempt, strategy) in WriteStrategy::LADDER.into_iter().enumerate() {
        let op = FieldOp::Write { selector, value: &field.value, strategy };
        let result = match run_op(driver, &op) {
            Ok(result) => result,
            Err(e) => {
                log::debug!("{:?} write to '{}' failed: {}", strategy, selector, e);
                continue;
            }
        };

        if !result.found {
            // Element went away between probe and write
            return None;
        }
        if let Some(error) = result.error {
            log::debug!("{:?} write to '{}' threw: {}", strategy, selector, error);
            continue;
        }

        let actual = result.actual.unwrap_or_default();
        if values_match(&field.value, &actual) {
            return Some(FieldOutcome {
                selector: selector.to_string(),
                verified: true,
                retried: attempt > 0,
            });
        }
        log::debug!("'{}' read back '{}' after {:?}", field.name, actual, strategy);
    }
    None
}
