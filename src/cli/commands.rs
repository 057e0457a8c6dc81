//! CLI command implementations

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::actions::{quai_plugin, Plugin};
use crate::chain::RpcConnector;
use crate::config::Config;
use crate::runtime::{ActionResponse, HandlerCallback, LocalRuntime, Memory};
use crate::wallet::{load_or_generate, WalletStore};

/// Name the CLI user speaks as in the local conversation
const CLI_USER: &str = "user";

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Load or create the wallet file without touching the network
pub async fn wallet(config: &Config) -> Result<()> {
    let path = Path::new(&config.wallet.path);
    let existed = path.exists();

    let (_signer, record) = load_or_generate(path, config.chain.zone)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load wallet: {}", e))?;

    println!("\n=== QUAI WALLET ===\n");
    println!("Path: {}", path.display());
    println!("Address: {}", record.address);
    println!("Zone: {}", config.chain.zone);
    println!("Created: {}", record.created_at.to_rfc3339());
    if !existed {
        println!("\nA new wallet was generated. Back up {} securely.", path.display());
    }
    println!();

    Ok(())
}

/// Run RECEIVE_QUAI and print the reply
pub async fn receive(config: &Config) -> Result<()> {
    let (runtime, plugin) = build(config)?;
    run_action(
        &runtime,
        &plugin,
        "RECEIVE_QUAI",
        "What's your QUAI address?",
    )
    .await
}

/// Run SEND_QUAI on a chat message
pub async fn send(config: &Config, message: &str) -> Result<()> {
    let (runtime, plugin) = build(config)?;
    run_action(&runtime, &plugin, "SEND_QUAI", message).await
}

/// List registered actions with similes and examples
pub fn list_actions(config: &Config) -> Result<()> {
    let (_runtime, plugin) = build(config)?;

    println!("\n=== PLUGIN: {} ===\n", plugin.name);
    println!("{}\n", plugin.description);

    for action in &plugin.actions {
        println!("{}", action.name());
        println!("  {}", action.description());
        println!("  Similes: {}", action.similes().join(", "));
        println!("  Examples:");
        for conversation in action.examples() {
            for turn in conversation {
                println!("    {}: {}", turn.user, turn.text);
            }
            println!();
        }
    }

    Ok(())
}

fn build(config: &Config) -> Result<(LocalRuntime, Plugin)> {
    let connector = RpcConnector::from_config(&config.chain)
        .map_err(|e| anyhow::anyhow!("Failed to create RPC connector: {}", e))?;
    info!("Using RPC endpoint {}", connector.rpc_url());

    let wallet = Arc::new(WalletStore::from_config(config, Arc::new(connector)));
    let runtime = LocalRuntime::new(config.agent.clone());
    Ok((runtime, quai_plugin(wallet)))
}

async fn run_action(
    runtime: &LocalRuntime,
    plugin: &Plugin,
    name: &str,
    text: &str,
) -> Result<()> {
    let action = plugin
        .find(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown action: {}", name))?;

    let message = Memory::new(CLI_USER, text);
    if !action.validate(runtime, &message).await {
        warn!("{} is unavailable: QUAI_PRIVATE_KEY is not set", action.name());
        anyhow::bail!("{} is unavailable in this runtime", action.name());
    }

    runtime.record(message.clone()).await;

    let agent = runtime.agent_name().to_string();
    let print: Box<HandlerCallback> = Box::new(move |response: ActionResponse| {
        println!("\n{}: {}", agent, response.text);
        if response.content.as_object().is_some_and(|c| !c.is_empty()) {
            println!("{}", response.content);
        }
    });

    if action.handler(runtime, &message, None, Some(&*print)).await {
        Ok(())
    } else {
        anyhow::bail!("{} did not complete", action.name())
    }
}
