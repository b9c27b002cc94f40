//! Checkout flow MCP server
//!
//! Serves the learned checkout flows of a flows directory to MCP clients, over stdio
//! or streamable HTTP.

use checkout_replay::config::{CheckoutConfig, FLOWS_DIR_ENV};
use checkout_replay::mcp::FlowServer;
use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "checkout-mcp")]
#[command(version)]
#[command(about = "MCP server for learned checkout flows", long_about = None)]
struct Cli {
    /// Directory holding one JSON file per learned domain
    #[arg(long, short = 'd', value_name = "DIR", env = FLOWS_DIR_ENV)]
    flows_dir: Option<PathBuf>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries the stdio transport, so logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CheckoutConfig::from_env();
    if let Some(dir) = cli.flows_dir {
        config = config.flows_dir(dir);
    }

    eprintln!("Checkout flow MCP server v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Flows directory: {}", config.flows_dir.display());

    match cli.transport {
        Transport::Stdio => {
            eprintln!("Transport: stdio");
            let server = FlowServer::new(config).serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);
            eprintln!("Transport: HTTP streamable");

            let service_factory = move || Ok::<_, std::io::Error>(FlowServer::new(config.clone()));
            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );
            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            eprintln!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);
            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
