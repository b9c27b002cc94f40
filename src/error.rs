use thiserror::Error;

/// Errors produced by the checkout replay engine
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Browser could not be launched
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Could not connect to a running browser
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// Tab creation, lookup or close failed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Navigation or history operation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// A script could not be evaluated in the page
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A script ran but returned something we could not decode
    #[error("Unexpected script result: {0}")]
    ScriptResult(String),

    /// No tool registered under this name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool parameters did not match the tool's schema
    #[error("Invalid parameters for tool '{tool}': {reason}")]
    InvalidParams { tool: String, reason: String },

    /// Tool ran and failed
    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    /// The exploring agent failed before producing a history
    #[error("Agent failed: {0}")]
    AgentFailed(String),

    /// Flow file could not be read or written
    #[error("Flow storage error for '{domain}': {reason}")]
    Storage { domain: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CheckoutError>;
