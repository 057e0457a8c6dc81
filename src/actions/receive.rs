//! RECEIVE_QUAI: share the agent's deposit address

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::runtime::{ActionResponse, AgentRuntime, HandlerCallback, Memory, State};
use crate::wallet::WalletStore;

use super::{respond, validate_settings, Action, ActionExample};

const SIMILES: &[&str] = &[
    "SEND_QUAI_TO_AGENT",
    "TRANSFER_QUAI_TO_AGENT",
    "GIVE_QUAI_TO_AGENT",
    "SEND_QUAI_TO_ME",
    "PROVIDE_QUAI_ADDRESS",
    "RECEIVE_QUAI_FROM_USER",
    "SHARE_QUAI_WALLET",
    "ACCEPT_QUAI_PAYMENT",
    "GET_QUAI_FROM_YOU",
    "DEPOSIT_QUAI_TO_AGENT",
    "QUAI_TO_AGENT_WALLET",
    "SEND_CRYPTO_TO_AGENT",
    "I_WANT_TO_SEND_QUAI",
];

const AGENT_REPLY: &str = "to send me quai, use this address: 0xAgentAddressHere";

pub struct ReceiveQuaiAction {
    wallet: Arc<WalletStore>,
}

impl ReceiveQuaiAction {
    pub fn new(wallet: Arc<WalletStore>) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl Action for ReceiveQuaiAction {
    fn name(&self) -> &'static str {
        "RECEIVE_QUAI"
    }

    fn similes(&self) -> &'static [&'static str] {
        SIMILES
    }

    fn description(&self) -> &'static str {
        "Triggers when the user wants to send Quai to the agent or requests the agent's Quai wallet address."
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        [
            ("{{user1}}", "I want to send you some Quai. What's your address?"),
            ("{{user2}}", "Can I send you Quai? Please provide your address."),
            ("{{user3}}", "I would like to send you QUAI"),
            ("{{user4}}", "Send you QUAI"),
            ("{{user5}}", "What’s your QUAI address?"),
        ]
        .into_iter()
        .map(|(user, text)| {
            vec![
                ActionExample::new(user, text),
                ActionExample::new("{{agent}}", AGENT_REPLY),
            ]
        })
        .collect()
    }

    async fn validate(&self, runtime: &dyn AgentRuntime, _message: &Memory) -> bool {
        validate_settings(runtime)
    }

    async fn handler(
        &self,
        _runtime: &dyn AgentRuntime,
        _message: &Memory,
        _state: Option<State>,
        callback: Option<&HandlerCallback>,
    ) -> bool {
        info!("Starting RECEIVE_QUAI handler...");

        match self.wallet.get_account().await {
            Ok(account) => {
                let address = account.address().to_checksum(None);
                respond(
                    callback,
                    ActionResponse::new(
                        format!(
                            "To send Quai to me, please use the following address: {}. Make sure to double-check the address before sending.",
                            address
                        ),
                        json!({ "address": address }),
                    ),
                );
                true
            }
            Err(e) => {
                error!("Error in RECEIVE_QUAI action: {}", e);
                respond(
                    callback,
                    ActionResponse::new(
                        "There was an error retrieving my address. Please try again later.",
                        json!({ "error": e.to_string() }),
                    ),
                );
                false
            }
        }
    }
}
