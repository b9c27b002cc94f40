use crate::error::Result;
use crate::flow::TraceEntry;
use crate::tools::ToolSession;

/// What the exploring agent is asked to do
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTask {
    pub prompt: String,

    /// Opened before the first agent step
    pub start_url: String,

    pub max_steps: u32,

    /// Actions the agent may batch into one step
    pub max_actions_per_step: u32,
}

/// Everything an agent run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentHistory {
    /// Actions in execution order, with the page URL each ran on
    pub trace: Vec<TraceEntry>,

    /// Text of the agent's final message
    pub final_result: Option<String>,

    /// The agent finished with its terminal action
    pub is_done: bool,
}

impl AgentHistory {
    /// Number of actions the agent took
    pub fn steps(&self) -> usize {
        self.trace.len()
    }

    pub fn final_text(&self) -> &str {
        self.final_result.as_deref().unwrap_or_default()
    }
}

/// An LLM-driven browser agent.
///
/// Implementations drive the same page the session's tools act on and call custom
/// tools through [`ToolSession::call`].
pub trait CheckoutAgent {
    fn run(&mut self, task: &AgentTask, tools: &mut ToolSession<'_>) -> Result<AgentHistory>;
}
