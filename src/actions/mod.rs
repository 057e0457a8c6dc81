//! Conversational actions
//!
//! # Architecture
//!
//! ```text
//! Plugin ("quai")
//!   ├── SEND_QUAI     state → context → generate_object → validate → WalletStore → Account
//!   └── RECEIVE_QUAI  WalletStore → address
//! ```
//!
//! Both actions are gated on the `QUAI_PRIVATE_KEY` setting being present.

pub mod receive;
pub mod send;
pub mod validate;

use std::sync::Arc;

use async_trait::async_trait;

use crate::runtime::{ActionResponse, AgentRuntime, HandlerCallback, Memory, State};
use crate::wallet::WalletStore;

pub use receive::ReceiveQuaiAction;
pub use send::SendQuaiAction;
pub use validate::{is_valid_transfer, Amount, TransferContent};

/// Setting whose presence enables the Quai actions
pub const PRIVATE_KEY_SETTING: &str = "QUAI_PRIVATE_KEY";

/// One turn of an example conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionExample {
    pub user: &'static str,
    pub text: &'static str,
}

impl ActionExample {
    pub const fn new(user: &'static str, text: &'static str) -> Self {
        Self { user, text }
    }
}

/// An action the agent can take in response to a message
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    /// Alternative names the action is also known by
    fn similes(&self) -> &'static [&'static str];

    fn description(&self) -> &'static str;

    /// Example conversations that should trigger the action
    fn examples(&self) -> Vec<Vec<ActionExample>>;

    /// Whether the action may run in this runtime
    async fn validate(&self, runtime: &dyn AgentRuntime, message: &Memory) -> bool;

    /// Run the action, reporting the outcome through `callback` when given
    async fn handler(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        state: Option<State>,
        callback: Option<&HandlerCallback>,
    ) -> bool;
}

/// A named bundle of actions
pub struct Plugin {
    pub name: &'static str,
    pub description: &'static str,
    pub actions: Vec<Arc<dyn Action>>,
}

impl Plugin {
    /// Look up an action by name or simile, ignoring case
    pub fn find(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions.iter().find(|action| {
            action.name().eq_ignore_ascii_case(name)
                || action.similes().iter().any(|s| s.eq_ignore_ascii_case(name))
        })
    }
}

/// The Quai plugin, with both actions sharing one wallet
pub fn quai_plugin(wallet: Arc<WalletStore>) -> Plugin {
    let send: Arc<dyn Action> = Arc::new(SendQuaiAction::new(Arc::clone(&wallet)));
    let receive: Arc<dyn Action> = Arc::new(ReceiveQuaiAction::new(wallet));
    Plugin {
        name: "quai",
        description: "Quai Plugin for Eliza",
        actions: vec![send, receive],
    }
}

/// True when the private key setting is present and non-empty
pub fn validate_settings(runtime: &dyn AgentRuntime) -> bool {
    runtime
        .get_setting(PRIVATE_KEY_SETTING)
        .is_some_and(|value| !value.is_empty())
}

/// Deliver a response if the caller asked for one
pub(crate) fn respond(callback: Option<&HandlerCallback>, response: ActionResponse) {
    if let Some(callback) = callback {
        callback(response);
    }
}
