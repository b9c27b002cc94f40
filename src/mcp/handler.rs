use crate::config::{CheckoutConfig, ReplayTiming};
use crate::flow::FlowStore;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};

/// MCP server over a directory of learned flows
#[derive(Clone)]
pub struct FlowServer {
    store: FlowStore,
    timing: ReplayTiming,
    tool_router: ToolRouter<Self>,
}

impl FlowServer {
    pub fn new(config: CheckoutConfig) -> Self {
        log::info!("Serving flows from {:?}", config.flows_dir);
        Self {
            store: FlowStore::new(config.flows_dir),
            timing: config.replay_timing,
            tool_router: Self::tool_router(),
        }
    }

    pub fn store(&self) -> &FlowStore {
        &self.store
    }

    pub fn timing(&self) -> &ReplayTiming {
        &self.timing
    }
}

#[tool_handler]
impl ServerHandler for FlowServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Checkout flow store. Use flow_list to see learned domains and their health, flow_get \
                 and flow_health to inspect one, flow_delete to force re-learning, and flow_replay_script \
                 to get the page script that replays a domain's cached navigation clicks."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
