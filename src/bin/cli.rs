//! Checkout flow CLI
//!
//! Inspect and manage the learned checkout flows of a flows directory.

use anyhow::{Context, bail};
use checkout_replay::config::{CheckoutConfig, FLOWS_DIR_ENV};
use checkout_replay::flow::{FlowOverview, FlowStore, evaluate};
use checkout_replay::replay::plan_for_flow;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "checkout-replay")]
#[command(version)]
#[command(about = "Inspect and manage learned checkout flows", long_about = None)]
struct Cli {
    /// Directory holding one JSON file per learned domain
    #[arg(long, short = 'd', value_name = "DIR", env = FLOWS_DIR_ENV, global = true)]
    flows_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every learned flow with its health
    List,

    /// Show the full flow of a domain
    Show {
        /// Domain or any URL on it
        domain: String,
    },

    /// Delete the flow of a domain so the next checkout learns from scratch
    Delete {
        /// Domain or any URL on it
        domain: String,
    },

    /// Evaluate the health of a domain's flow
    Health {
        /// Domain or any URL on it
        domain: String,
    },

    /// Print the replay script for a domain's cached navigation clicks
    Script {
        /// Domain or any URL on it
        domain: String,

        /// Product page that clicks without a recorded page are attributed to
        #[arg(long, value_name = "URL")]
        product_url: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = CheckoutConfig::from_env();
    if let Some(dir) = cli.flows_dir {
        config = config.flows_dir(dir);
    }
    let store = FlowStore::new(config.flows_dir.clone());
    log::debug!("Using flows directory {:?}", store.directory());

    match cli.command {
        Commands::List => {
            let flows: Vec<FlowOverview> = store.records().iter().map(FlowOverview::from).collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&flows)?);
            } else if flows.is_empty() {
                println!("No learned flows in {}", store.directory().display());
            } else {
                println!(
                    "{:<32} {:<12} {:>4} {:>4} {:>6} {:>5} {:>5} {}",
                    "DOMAIN", "PLATFORM", "OK", "FAIL", "RATE", "NAV", "FORM", "STATUS"
                );
                for flow in &flows {
                    println!(
                        "{:<32} {:<12} {:>4} {:>4} {:>5.1}% {:>5} {:>5} {}",
                        flow.summary.domain,
                        flow.summary.platform.as_str(),
                        flow.summary.success_count,
                        flow.summary.failure_count,
                        flow.success_rate,
                        flow.summary.nav_steps,
                        flow.summary.form_fields,
                        flow.status
                    );
                }
            }
        }
        Commands::Show { domain } => {
            let flow = store.load(&domain).with_context(|| format!("No saved flow for '{}'", domain))?;
            println!("{}", serde_json::to_string_pretty(&flow)?);
        }
        Commands::Delete { domain } => {
            if store.delete(&domain) {
                println!("Deleted flow for {}", domain);
            } else {
                bail!("No saved flow for '{}'", domain);
            }
        }
        Commands::Health { domain } => {
            let flow = store.load(&domain).with_context(|| format!("No saved flow for '{}'", domain))?;
            let health = evaluate(&flow);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("{}: {}", flow.domain, health.status);
                println!("  success rate:         {:.1}%", health.success_rate);
                println!("  runs:                 {} ok, {} failed", health.success_count, health.failure_count);
                println!("  consecutive failures: {}", health.consecutive_failures);
                println!("  needs relearn:        {}", health.needs_relearn);
                println!(
                    "  cached:               {} nav steps, {} form and {} payment selectors",
                    health.nav_steps, health.form_selectors, health.payment_selectors
                );
            }
        }
        Commands::Script { domain, product_url } => {
            let flow = store.load(&domain).with_context(|| format!("No saved flow for '{}'", domain))?;
            let plan = plan_for_flow(&flow, product_url.as_deref());
            if plan.is_empty() {
                bail!("Flow for '{}' has no replayable clicks", flow.domain);
            }
            println!("{}", plan.to_script(&config.replay_timing)?);
        }
    }

    Ok(())
}
