//! Agent framework contract
//!
//! Actions never talk to a model or a message store directly. They go through
//! an [`AgentRuntime`], which exposes settings, builds conversation [`State`],
//! and turns a composed prompt into a structured object.

pub mod local;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use local::LocalRuntime;

/// Size class of the model used for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelClass {
    Small,
    Medium,
    Large,
}

/// Payload of a message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    /// Action the message triggered, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub user: String,
    pub content: Content,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            content: Content {
                text: text.into(),
                action: None,
            },
            created_at: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }
}

/// Conversation state handed to actions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub agent_name: String,
    /// Recent messages rendered one per line as `user: text`
    pub recent_messages: String,
    /// Additional template values
    pub values: HashMap<String, String>,
}

impl State {
    /// Value for a `{{key}}` template placeholder
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "agentName" => Some(&self.agent_name),
            "recentMessages" => Some(&self.recent_messages),
            _ => self.values.get(key).map(String::as_str),
        }
    }
}

/// Result reported to the caller of an action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    pub text: String,
    pub content: Value,
}

impl ActionResponse {
    pub fn new(text: impl Into<String>, content: Value) -> Self {
        Self {
            text: text.into(),
            content,
        }
    }
}

/// Receives the outcome of a handler invocation
pub type HandlerCallback = dyn Fn(ActionResponse) + Send + Sync;

/// Services an agent framework provides to actions
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Look up a named setting
    fn get_setting(&self, key: &str) -> Option<String>;

    /// Build fresh state for an inbound message
    async fn compose_state(&self, message: &Memory) -> Result<State>;

    /// Refresh the recent-message portion of an existing state
    async fn update_recent_message_state(&self, state: State) -> Result<State>;

    /// Generate a structured object from a composed prompt
    async fn generate_object(&self, context: &str, model: ModelClass) -> Result<Value>;
}

lazy_static::lazy_static! {
    /// `{{key}}` template placeholder
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{(\w+)\}\}").expect("Invalid placeholder pattern");
}

/// Substitute `{{key}}` placeholders in `template` with values from `state`.
///
/// Unknown keys render as the empty string.
pub fn compose_context(state: &State, template: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            state.get(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}
