//! In-process runtime used by the command line
//!
//! Keeps the conversation in memory and stands in for the model with a
//! pattern-based extractor that reads transfer details straight from the most
//! recent user messages.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::Result;

use super::{AgentRuntime, Memory, ModelClass, State};

/// Number of messages rendered into `recentMessages`
pub const RECENT_MESSAGE_COUNT: usize = 10;

lazy_static::lazy_static! {
    /// "<number> quai", e.g. "0.5 QUAI"
    static ref AMOUNT: Regex =
        Regex::new(r"(?i)(\d+(?:\.\d+)?|\.\d+)\s*quai\b").expect("Invalid amount pattern");

    /// Anything that looks like a hex address; length is checked downstream
    static ref RECIPIENT: Regex =
        Regex::new(r"\b0x[0-9a-zA-Z]+").expect("Invalid recipient pattern");
}

pub struct LocalRuntime {
    config: AgentConfig,
    history: RwLock<Vec<Memory>>,
}

impl LocalRuntime {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.config.name
    }

    /// Append a message to the conversation
    pub async fn record(&self, message: Memory) {
        self.history.write().await.push(message);
    }

    async fn render_recent(&self) -> String {
        let history = self.history.read().await;
        let start = history.len().saturating_sub(RECENT_MESSAGE_COUNT);
        history[start..]
            .iter()
            .map(|m| format!("{}: {}", m.user, m.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pull `recipient` and `amount` from the newest user messages that mention them
    async fn extract_transfer(&self) -> Value {
        let history = self.history.read().await;
        let mut recipient = None;
        let mut amount = None;

        for message in history
            .iter()
            .rev()
            .take(RECENT_MESSAGE_COUNT)
            .filter(|m| m.user != self.config.name)
        {
            if recipient.is_none() {
                recipient = RECIPIENT.find(message.text()).map(|m| m.as_str().to_string());
            }
            if amount.is_none() {
                amount = AMOUNT
                    .captures(message.text())
                    .map(|caps| caps[1].to_string());
            }
            if recipient.is_some() && amount.is_some() {
                break;
            }
        }

        let mut object = Map::new();
        if let Some(recipient) = recipient {
            object.insert("recipient".into(), json!(recipient));
        }
        if let Some(amount) = amount {
            object.insert("amount".into(), json!(amount));
        }
        Value::Object(object)
    }
}

#[async_trait]
impl AgentRuntime for LocalRuntime {
    fn get_setting(&self, key: &str) -> Option<String> {
        if let Ok(value) = std::env::var(key) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        self.config
            .settings
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
    }

    async fn compose_state(&self, _message: &Memory) -> Result<State> {
        Ok(State {
            agent_name: self.config.name.clone(),
            recent_messages: self.render_recent().await,
            ..State::default()
        })
    }

    async fn update_recent_message_state(&self, mut state: State) -> Result<State> {
        state.recent_messages = self.render_recent().await;
        Ok(state)
    }

    async fn generate_object(&self, _context: &str, model: ModelClass) -> Result<Value> {
        let object = self.extract_transfer().await;
        debug!("Local extraction ({:?}): {}", model, object);
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ADDR: &str = "0x0005C06bD1339c79700a8DAb35DE0a1b61dFBD71";

    fn runtime() -> LocalRuntime {
        LocalRuntime::new(AgentConfig {
            name: "quaibot".into(),
            settings: HashMap::from([("LOCAL_RUNTIME_TEST_KEY".into(), "from-config".into())]),
        })
    }

    #[tokio::test]
    async fn test_extracts_recipient_and_amount() {
        let rt = runtime();
        rt.record(Memory::new("alice", format!("Send 10 QUAI to {}", ADDR))).await;

        let object = rt.generate_object("", ModelClass::Medium).await.unwrap();
        assert_eq!(object, json!({ "recipient": ADDR, "amount": "10" }));
    }

    #[tokio::test]
    async fn test_extraction_spans_messages_and_skips_agent() {
        let rt = runtime();
        rt.record(Memory::new("alice", format!("my address is {}", ADDR))).await;
        rt.record(Memory::new("quaibot", "send me 0x00ff and how much?")).await;
        rt.record(Memory::new("alice", "make it 0.5 quai")).await;

        let object = rt.generate_object("", ModelClass::Medium).await.unwrap();
        assert_eq!(object["recipient"], ADDR);
        assert_eq!(object["amount"], "0.5");
    }

    #[tokio::test]
    async fn test_missing_amount_is_omitted() {
        let rt = runtime();
        rt.record(Memory::new("alice", format!("Send QUAI to {}", ADDR))).await;

        let object = rt.generate_object("", ModelClass::Medium).await.unwrap();
        assert!(object.get("amount").is_none());
        assert_eq!(object["recipient"], ADDR);
    }

    #[tokio::test]
    async fn test_compose_state_renders_recent_messages() {
        let rt = runtime();
        let message = Memory::new("alice", "hello");
        rt.record(message.clone()).await;
        rt.record(Memory::new("quaibot", "hi")).await;

        let state = rt.compose_state(&message).await.unwrap();
        assert_eq!(state.agent_name, "quaibot");
        assert_eq!(state.recent_messages, "alice: hello\nquaibot: hi");
    }

    #[test]
    fn test_setting_falls_back_to_config() {
        let rt = runtime();
        assert_eq!(
            rt.get_setting("LOCAL_RUNTIME_TEST_KEY").as_deref(),
            Some("from-config")
        );
        assert_eq!(rt.get_setting("LOCAL_RUNTIME_UNSET_KEY"), None);
    }
}
