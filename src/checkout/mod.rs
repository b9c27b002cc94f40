//! Checkout orchestration
//!
//! A run loads what is known about the domain, arms the replay script for the cached
//! navigation prefix, lets the agent finish the checkout with the custom tools, and
//! saves what the successful run taught us.

pub mod agent;
pub mod prompt;
pub mod request;
pub mod runner;

pub use agent::{AgentHistory, AgentTask, CheckoutAgent};
pub use prompt::{Visit, task_prompt};
pub use request::{
    CardDetails, CheckoutRequest, CheckoutResult, DECISION_NEEDED, DRY_RUN_COMPLETE, DecisionPoint, DecisionType,
    ShippingAddress,
};
pub use runner::CheckoutRunner;
