//! Test doubles for the chain and agent runtime seams

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::Value;

use crate::chain::{Account, ChainConnector, PendingTransaction, Receipt, TransactionRequest};
use crate::error::{Error, Result};
use crate::runtime::{ActionResponse, AgentRuntime, HandlerCallback, Memory, ModelClass, State};

/// How a [`MockAccount`] answers submissions
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Submission succeeds and the receipt carries this status
    Receipt(u64),
    /// Submission fails with this message
    SendError(String),
}

pub struct MockAccount {
    address: Address,
    outcome: MockOutcome,
    pub hash: TxHash,
    pub sent: Mutex<Vec<TransactionRequest>>,
}

impl MockAccount {
    pub fn new(address: Address, outcome: MockOutcome) -> Self {
        Self {
            address,
            outcome,
            hash: TxHash::repeat_byte(0x42),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Account for MockAccount {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<PendingTransaction> {
        self.sent.lock().unwrap().push(request);
        match &self.outcome {
            MockOutcome::SendError(message) => Err(Error::TransactionSend(message.clone())),
            MockOutcome::Receipt(_) => Ok(PendingTransaction { hash: self.hash }),
        }
    }

    async fn wait(&self, pending: &PendingTransaction) -> Result<Receipt> {
        let status = match &self.outcome {
            MockOutcome::Receipt(status) => *status,
            MockOutcome::SendError(message) => return Err(Error::Rpc(message.clone())),
        };
        Ok(Receipt {
            hash: pending.hash,
            status,
            block_number: Some(1),
        })
    }
}

/// Connector handing out [`MockAccount`]s and counting connections
pub struct MockConnector {
    outcome: MockOutcome,
    pub connects: AtomicUsize,
    pub accounts: Mutex<Vec<Arc<MockAccount>>>,
}

impl MockConnector {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            connects: AtomicUsize::new(0),
            accounts: Mutex::new(Vec::new()),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// The most recently connected account
    pub fn last_account(&self) -> Option<Arc<MockAccount>> {
        self.accounts.lock().unwrap().last().cloned()
    }
}

impl ChainConnector for MockConnector {
    fn connect(&self, signer: PrivateKeySigner) -> Result<Arc<dyn Account>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let account = Arc::new(MockAccount::new(signer.address(), self.outcome.clone()));
        self.accounts.lock().unwrap().push(Arc::clone(&account));
        Ok(account)
    }
}

/// Scripted runtime: fixed settings and a canned generated object
pub struct MockRuntime {
    pub settings: HashMap<String, String>,
    pub generated: std::result::Result<Value, String>,
    pub composed: AtomicUsize,
    pub updated: AtomicUsize,
    pub contexts: Mutex<Vec<String>>,
}

impl MockRuntime {
    pub fn new(generated: Value) -> Self {
        Self {
            settings: HashMap::from([("QUAI_PRIVATE_KEY".to_string(), "set".to_string())]),
            generated: Ok(generated),
            composed: AtomicUsize::new(0),
            updated: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            generated: Err(message.to_string()),
            ..Self::new(Value::Null)
        }
    }
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.settings.get(key).cloned()
    }

    async fn compose_state(&self, message: &Memory) -> Result<State> {
        self.composed.fetch_add(1, Ordering::SeqCst);
        Ok(State {
            agent_name: "agent".into(),
            recent_messages: format!("{}: {}", message.user, message.text()),
            ..State::default()
        })
    }

    async fn update_recent_message_state(&self, state: State) -> Result<State> {
        self.updated.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }

    async fn generate_object(&self, context: &str, _model: ModelClass) -> Result<Value> {
        self.contexts.lock().unwrap().push(context.to_string());
        self.generated.clone().map_err(Error::Model)
    }
}

/// Callback that records every response it receives
pub fn recording_callback() -> (Arc<Mutex<Vec<ActionResponse>>>, Box<HandlerCallback>) {
    let responses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&responses);
    let callback: Box<HandlerCallback> =
        Box::new(move |response: ActionResponse| sink.lock().unwrap().push(response));
    (responses, callback)
}
