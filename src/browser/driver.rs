use crate::error::{CheckoutError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Page capabilities the checkout engine relies on.
///
/// Scripts handed to [`PageDriver::evaluate`] are JavaScript function expressions. The
/// driver calls them with `args` (or no arguments) and awaits a returned promise.
pub trait PageDriver {
    /// Run a function expression in the page and return its result
    fn evaluate(&self, script: &str, args: Option<&Value>) -> Result<Value>;

    /// URL of the page currently loaded
    fn current_url(&self) -> Result<String>;

    /// Register a script that runs on every new document in this session
    fn add_init_script(&self, script: &str) -> Result<()>;
}

/// Build the expression that invokes a function expression with JSON arguments
pub fn invocation(script: &str, args: Option<&Value>) -> String {
    let args = args.map(|a| a.to_string()).unwrap_or_default();
    format!("({})({})", script.trim(), args)
}

/// Decode a script result into a typed value.
///
/// Page scripts return `JSON.stringify(...)` so the value crosses the CDP boundary as a
/// string; an already-structured object is accepted as well.
pub fn decode_script_result<T: DeserializeOwned>(value: Value) -> Result<T> {
    match value {
        Value::String(json) => serde_json::from_str(&json)
            .map_err(|e| CheckoutError::ScriptResult(format!("Failed to parse script JSON: {}", e))),
        Value::Null => Err(CheckoutError::ScriptResult("Script returned no value".to_string())),
        other => serde_json::from_value(other)
            .map_err(|e| CheckoutError::ScriptResult(format!("Failed to decode script result: {}", e))),
    }
}
