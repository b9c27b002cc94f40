//! # checkout-replay
//!
//! Learns multi-page web checkout flows per domain, caches them, and replays the cached
//! navigation on later visits so an exploring agent only has to finish the forms.
//!
//! ## Features
//!
//! - **Flow store**: one JSON file per domain with navigation steps, form and payment selectors, counters
//! - **Replay**: cached pre-form clicks compiled into a page script that survives navigations
//! - **Verified form filling**: candidate selectors, read-back verification and two fallback write strategies
//! - **Discovery**: field scan, taxonomy mapping and platform detection on the final page
//! - **Health**: success rates and re-learn signals derived from the counters
//! - **MCP Server**: flow inspection and management for MCP clients
//!
//! ## Running a checkout
//!
//! The exploring agent is pluggable through [`CheckoutAgent`](checkout::CheckoutAgent); it drives
//! the page and calls the custom tools through the [`ToolSession`](tools::ToolSession) it is handed.
//!
//! ```rust,no_run
//! use checkout_replay::checkout::{AgentHistory, AgentTask, CheckoutAgent};
//! use checkout_replay::tools::ToolSession;
//! use checkout_replay::{BrowserSession, CheckoutConfig, CheckoutRequest, CheckoutRunner, LaunchOptions};
//! use serde_json::json;
//!
//! struct FormsOnly;
//!
//! impl CheckoutAgent for FormsOnly {
//!     fn run(&mut self, _task: &AgentTask, tools: &mut ToolSession<'_>) -> checkout_replay::Result<AgentHistory> {
//!         tools.call("fill_shipping_form", json!({}))?;
//!         Ok(AgentHistory::default())
//!     }
//! }
//!
//! # fn main() -> checkout_replay::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let runner = CheckoutRunner::new(CheckoutConfig::from_env(), &session);
//!
//! let result = runner.run(&mut FormsOnly, &CheckoutRequest::new("https://shop.example/products/mug"));
//! println!("success: {}, replayed: {}", result.success, result.replay_steps_used);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and the [`PageDriver`] seam
//! - [`checkout`]: Request and result types, task prompts, the runner
//! - [`discovery`]: Selector discovery, liveness checks, platform detection
//! - [`fill`]: Verified form filling
//! - [`flow`]: Flow records, the store, health, trace extraction
//! - [`replay`]: Replay plan compilation and installation
//! - [`tools`]: Custom agent tools
//! - [`mcp`]: **Model Context Protocol server** over the flow store (requires `mcp-handler` feature)

pub mod browser;
pub mod checkout;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod fill;
pub mod flow;
pub mod replay;
pub mod tools;
pub mod utils;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions, PageDriver};
pub use checkout::{CheckoutRequest, CheckoutResult, CheckoutRunner};
pub use config::CheckoutConfig;
pub use error::{CheckoutError, Result};
pub use flow::{FlowRecord, FlowStore};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::FlowServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
