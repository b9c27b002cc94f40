//! In-memory pages shared by the tool tests

use crate::browser::PageDriver;
use crate::error::{CheckoutError, Result};
use crate::fill::FIELD_OP_SCRIPT;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Page whose text controls store whatever is written and read it back unchanged.
/// Any other script is answered from `scripts`, keyed by its exact text.
#[derive(Default)]
pub struct EchoForm {
    controls: HashSet<String>,
    scripts: HashMap<&'static str, Vec<Value>>,
    pub written: RefCell<Vec<(String, String)>>,
    pub evaluated: RefCell<Vec<(String, Option<Value>)>>,
}

impl EchoForm {
    pub fn with(controls: &[&str]) -> Self {
        Self { controls: controls.iter().map(|s| s.to_string()).collect(), ..Default::default() }
    }

    /// Queue the answers a script returns, one per call
    pub fn answer(mut self, script: &'static str, answers: Vec<Value>) -> Self {
        self.scripts.insert(script, answers);
        self
    }
}

impl PageDriver for EchoForm {
    fn evaluate(&self, script: &str, args: Option<&Value>) -> Result<Value> {
        if script != FIELD_OP_SCRIPT {
            let call = self.evaluated.borrow().iter().filter(|(s, _)| s == script).count();
            self.evaluated.borrow_mut().push((script.to_string(), args.cloned()));
            return self
                .scripts
                .get(script)
                .and_then(|answers| answers.get(call))
                .cloned()
                .ok_or_else(|| CheckoutError::EvaluationFailed("script not available".to_string()));
        }

        let args = args.cloned().unwrap_or(Value::Null);
        let selector = args["selector"].as_str().unwrap_or_default();
        let found = self.controls.contains(selector);
        let response = match args["op"].as_str() {
            Some("write") if found => {
                let value = args["value"].as_str().unwrap_or_default().to_string();
                self.written.borrow_mut().push((selector.to_string(), value.clone()));
                json!({"found": true, "isSelect": false, "actual": value})
            }
            _ => json!({"found": found, "isSelect": false}),
        };
        Ok(Value::String(response.to_string()))
    }

    fn current_url(&self) -> Result<String> {
        Ok("https://shop.nl/checkout".to_string())
    }

    fn add_init_script(&self, _script: &str) -> Result<()> {
        Ok(())
    }
}
