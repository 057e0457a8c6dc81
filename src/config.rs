//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::chain::Zone;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Base RPC endpoint of the chain node
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Append the zone path segment to `rpc_url`
    #[serde(default = "default_true")]
    pub use_pathing: bool,

    /// Zone the wallet address is derived in and transactions are routed to
    #[serde(default = "default_zone")]
    pub zone: Zone,

    /// Delay between receipt polls while waiting for inclusion
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
}

impl ChainConfig {
    /// RPC URL with the zone path applied when pathing is enabled
    pub fn zone_rpc_url(&self) -> String {
        if self.use_pathing {
            format!("{}/{}", self.rpc_url.trim_end_matches('/'), self.zone.path())
        } else {
            self.rpc_url.clone()
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            use_pathing: true,
            zone: default_zone(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Location of the persisted wallet record
    #[serde(default = "default_wallet_path")]
    pub path: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            path: default_wallet_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Name the agent speaks as
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Runtime settings exposed to actions (environment variables take precedence)
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            settings: HashMap::new(),
        }
    }
}

// Default value functions
fn default_rpc_url() -> String {
    "https://rpc.quai.network".to_string()
}

fn default_zone() -> Zone {
    Zone::Cyprus1
}

fn default_receipt_poll_interval_ms() -> u64 {
    1000
}

fn default_wallet_path() -> String {
    "./data/quai_wallet.json".to_string()
}

fn default_agent_name() -> String {
    "agent".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("chain.rpc_url", default_rpc_url())?
            .set_default("chain.use_pathing", true)?
            .set_default("wallet.path", default_wallet_path())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (QUAI_AGENT__SECTION__KEY)
            .add_source(
                config::Environment::with_prefix("QUAI_AGENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.chain.zone_rpc_url())
            .with_context(|| format!("Invalid rpc_url: {}", self.chain.rpc_url))?;

        if self.chain.receipt_poll_interval_ms == 0 {
            anyhow::bail!("receipt_poll_interval_ms must be positive");
        }

        if self.wallet.path.trim().is_empty() {
            anyhow::bail!("wallet.path cannot be empty");
        }

        if !self.chain.use_pathing {
            tracing::warn!(
                "RPC pathing disabled - {} must already route to zone {}",
                self.chain.rpc_url,
                self.chain.zone
            );
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        let mut settings: Vec<_> = self.agent.settings.keys().collect();
        settings.sort();
        let settings = settings
            .into_iter()
            .map(|k| format!("    {}: ***", k))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Configuration:
  Chain:
    rpc_url: {}
    zone: {}
    use_pathing: {}
    receipt_poll_interval: {}ms
  Wallet:
    path: {}
  Agent:
    name: {}
  Settings:
{}
"#,
            mask_url(&self.chain.zone_rpc_url()),
            self.chain.zone,
            self.chain.use_pathing,
            self.chain.receipt_poll_interval_ms,
            self.wallet.path,
            self.agent.name,
            if settings.is_empty() {
                "    (none)".to_string()
            } else {
                settings
            },
        )
    }
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            wallet: WalletConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}
