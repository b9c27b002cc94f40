//! Learned checkout flows
//!
//! - record: the persisted per-domain [`FlowRecord`] and its navigation steps
//! - store: the JSON file store with merge and counter semantics
//! - health: pure reliability evaluation of a record
//! - extract: agent trace → replayable navigation steps

pub mod extract;
pub mod health;
pub mod record;
pub mod store;

pub use extract::{AgentAction, TraceEntry, classify_purpose, extract_navigation_steps};
pub use health::{FlowHealth, FlowOverview, HealthStatus, evaluate};
pub use record::{
    ClickStep, FlowRecord, FlowSummary, FlowUpdate, NavigationStep, Platform, SelectorSet, StepPurpose,
};
pub use store::{FlowStore, now_timestamp};
