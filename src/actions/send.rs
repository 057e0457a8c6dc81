//! SEND_QUAI: transfer native coin from the agent wallet

use std::sync::Arc;

use alloy::primitives::TxHash;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info};

use crate::chain::{
    format_units, get_address, is_quai_address, parse_units, TransactionRequest, QUAI_DECIMALS,
};
use crate::error::ActionError;
use crate::runtime::{
    compose_context, ActionResponse, AgentRuntime, HandlerCallback, Memory, ModelClass, State,
};
use crate::wallet::WalletStore;

use super::{respond, validate_settings, Action, ActionExample, TransferContent};

/// Prompt used to pull recipient and amount out of the conversation
pub const TRANSFER_TEMPLATE: &str = r#"Respond with a JSON markdown block containing only the extracted values.

Example response:
```json
{
    "recipient": "0x0005C06bD1339c79700a8DAb35DE0a1b61dFBD71",
    "amount": "0.001"
}
```

{{recentMessages}}

Given the recent messages, extract the following information about the requested QUAI transfer:
- Recipient wallet address
- Amount to send in QUAI

Respond with a JSON markdown block containing only the extracted values."#;

const SIMILES: &[&str] = &[
    "TRANSFER_QUAI",
    "SEND_NATIVE_QUAI",
    "PAY_WITH_QUAI",
    "SEND_QUAI_FROM_AGENT",
    "TRANSFER_QUAI_TO_ADDRESS",
    "GIVE_QUAI_TO_RECIPIENT",
    "MOVE_QUAI_TO_WALLET",
    "DISPATCH_QUAI",
    "FORWARD_QUAI",
    "SEND_QUAI_PAYMENT",
    "TRANSFER_CRYPTO_QUAI",
    "EXECUTE_QUAI_TRANSFER",
    "SEND_QUAI_TO_USER",
];

pub struct SendQuaiAction {
    wallet: Arc<WalletStore>,
}

impl SendQuaiAction {
    pub fn new(wallet: Arc<WalletStore>) -> Self {
        Self { wallet }
    }

    /// Extract, validate and execute the transfer, returning the mined hash
    async fn transfer(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        state: Option<State>,
    ) -> std::result::Result<TxHash, ActionError> {
        let state = match state {
            Some(state) => runtime.update_recent_message_state(state).await,
            None => runtime.compose_state(message).await,
        }
        .map_err(|e| ActionError::Extraction(e.to_string()))?;

        let context = compose_context(&state, TRANSFER_TEMPLATE);
        let generated = runtime
            .generate_object(&context, ModelClass::Medium)
            .await
            .map_err(|e| ActionError::Extraction(e.to_string()))?;
        debug!("Generated transfer content: {}", generated);

        let content = TransferContent::from_value(&generated).ok_or(ActionError::Validation)?;

        let account = self.wallet.get_account().await?;
        let value = parse_units(&content.amount.to_string(), QUAI_DECIMALS)?;

        let to = get_address(&content.recipient)
            .ok()
            .filter(is_quai_address)
            .ok_or_else(|| ActionError::InvalidRecipient(content.recipient.clone()))?;

        info!(
            "Transferring {} QUAI from {} to {}",
            format_units(value, QUAI_DECIMALS),
            account.address(),
            to
        );

        let request = TransactionRequest {
            to,
            value,
            from: account.address(),
        };
        let pending = account.send_transaction(request).await?;
        info!("Submitted transaction {}", pending.hash);

        let receipt = account.wait(&pending).await?;
        if receipt.is_success() {
            Ok(receipt.hash)
        } else {
            Err(ActionError::OnChainFailure(receipt.hash))
        }
    }
}

#[async_trait]
impl Action for SendQuaiAction {
    fn name(&self) -> &'static str {
        "SEND_QUAI"
    }

    fn similes(&self) -> &'static [&'static str] {
        SIMILES
    }

    fn description(&self) -> &'static str {
        "MUST use this action if the user requests the agent to send or transfer native QUAI to a specified address."
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        vec![
            vec![
                ActionExample::new(
                    "{{user1}}",
                    "Send 10 QUAI to 0x009d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7",
                ),
                ActionExample::new(
                    "{{agent}}",
                    "transferring 10 quai to that address now. hold tight.",
                ),
            ],
            vec![
                ActionExample::new(
                    "{{user1}}",
                    "Please send 0.5 QUAI to 0x00fe2b97c1fd336e750087d68b9b867997fd64a2661ff3ca5a7c771641e8e7ac",
                ),
                ActionExample::new(
                    "{{agent}}",
                    "got it. sending 0.5 quai to that address. will confirm when it’s done.",
                ),
            ],
            vec![
                ActionExample::new("{{user2}}", "Transfer 2 QUAI to 0x0034..."),
                ActionExample::new("{{agent}}", "moving 2 quai to 0x0034... as we speak."),
            ],
            vec![
                ActionExample::new("{{user3}}", "Pay 1 QUAI to 0x0078..."),
                ActionExample::new("{{agent}}", "paying 1 quai to 0x0078... let’s make it happen."),
            ],
            vec![
                ActionExample::new("{{user4}}", "Give 5 QUAI to 0x00bc..."),
                ActionExample::new("{{agent}}", "handing over 5 quai to 0x00bc... consider it done."),
            ],
            vec![
                ActionExample::new("{{user5}}", "Send 0.1 QUAI to my friend at 0x00f0..."),
                ActionExample::new(
                    "{{agent}}",
                    "sending 0.1 quai to your friend’s wallet at 0x00f0... should be there soon.",
                ),
            ],
            vec![
                ActionExample::new("{{user6}}", "Move 3 QUAI to 0x00ed..."),
                ActionExample::new("{{agent}}", "shifting 3 quai to 0x00ed... on its way."),
            ],
        ]
    }

    async fn validate(&self, runtime: &dyn AgentRuntime, _message: &Memory) -> bool {
        validate_settings(runtime)
    }

    async fn handler(
        &self,
        runtime: &dyn AgentRuntime,
        message: &Memory,
        state: Option<State>,
        callback: Option<&HandlerCallback>,
    ) -> bool {
        info!("Starting SEND_QUAI handler...");

        match self.transfer(runtime, message, state).await {
            Ok(hash) => {
                info!("Transfer completed: {}", hash);
                respond(
                    callback,
                    ActionResponse::new(
                        format!("Transfer completed successfully! tx: {}", hash),
                        json!({}),
                    ),
                );
                true
            }
            Err(e) => {
                error!("SEND_QUAI failed: {}", e);
                respond(callback, ActionResponse::new(e.user_message(), e.payload()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Account, Zone, U256};
    use crate::testing::{recording_callback, MockConnector, MockOutcome, MockRuntime};
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    const RECIPIENT: &str = "0x0005c06bd1339c79700a8dab35de0a1b61dfbd71";

    struct Harness {
        _dir: TempDir,
        connector: Arc<MockConnector>,
        action: SendQuaiAction,
    }

    fn harness(outcome: MockOutcome) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let connector = Arc::new(MockConnector::new(outcome));
        let wallet = Arc::new(WalletStore::new(
            dir.path().join("quai_wallet.json"),
            Zone::Cyprus1,
            connector.clone(),
        ));
        Harness {
            _dir: dir,
            connector,
            action: SendQuaiAction::new(wallet),
        }
    }

    fn message() -> Memory {
        Memory::new("alice", format!("Send 0.001 QUAI to {}", RECIPIENT))
    }

    #[tokio::test]
    async fn test_successful_transfer() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT, "amount": "0.001" }));
        let (responses, callback) = recording_callback();

        let ok = h
            .action
            .handler(&runtime, &message(), None, Some(&*callback))
            .await;
        assert!(ok);

        let account = h.connector.last_account().unwrap();
        let sent = account.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, get_address(RECIPIENT).unwrap());
        assert_eq!(sent[0].value, U256::from(1_000_000_000_000_000u64));
        assert_eq!(sent[0].from, account.address());

        let responses = responses.lock().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses[0].text,
            format!("Transfer completed successfully! tx: {}", account.hash)
        );
        assert_eq!(responses[0].content, json!({}));
    }

    #[tokio::test]
    async fn test_numeric_amount_is_scaled() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT, "amount": 10 }));

        assert!(h.action.handler(&runtime, &message(), None, None).await);

        let sent = h.connector.last_account().unwrap().sent();
        assert_eq!(sent[0].value, U256::from(10_000_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_missing_amount_is_rejected_before_wallet() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT }));
        let (responses, callback) = recording_callback();

        let ok = h
            .action
            .handler(&runtime, &message(), None, Some(&*callback))
            .await;
        assert!(!ok);
        assert_eq!(h.connector.connect_count(), 0);

        let responses = responses.lock().unwrap();
        assert_eq!(
            responses[0].text,
            "Not enough information to transfer QUAI. Please provide recipient and amount."
        );
        assert_eq!(responses[0].content, json!({ "error": "Invalid transfer content" }));
    }

    #[tokio::test]
    async fn test_invalid_recipient_returns_without_submitting() {
        let h = harness(MockOutcome::Receipt(1));
        let bad = format!("0x{}", "z".repeat(40));
        let runtime = MockRuntime::new(json!({ "recipient": bad, "amount": "1" }));
        let (responses, callback) = recording_callback();

        let ok = h
            .action
            .handler(&runtime, &message(), None, Some(&*callback))
            .await;
        assert!(!ok);
        assert!(h.connector.last_account().unwrap().sent().is_empty());

        let responses = responses.lock().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].text, format!("Invalid recipient address: {}", bad));
        assert_eq!(responses[0].content, json!({ "error": "Invalid recipient address" }));
    }

    #[tokio::test]
    async fn test_qi_recipient_is_rejected() {
        let h = harness(MockOutcome::Receipt(1));
        let qi = "0x0085c06bd1339c79700a8dab35de0a1b61dfbd71";
        let runtime = MockRuntime::new(json!({ "recipient": qi, "amount": "1" }));

        assert!(!h.action.handler(&runtime, &message(), None, None).await);
        assert!(h.connector.last_account().unwrap().sent().is_empty());
    }

    #[tokio::test]
    async fn test_reverted_receipt_reports_hash() {
        let h = harness(MockOutcome::Receipt(0));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT, "amount": "1" }));
        let (responses, callback) = recording_callback();

        let ok = h
            .action
            .handler(&runtime, &message(), None, Some(&*callback))
            .await;
        assert!(!ok);

        let hash = h.connector.last_account().unwrap().hash;
        let responses = responses.lock().unwrap();
        assert_eq!(
            responses[0].text,
            format!("Transfer failed. Transaction hash: {}", hash)
        );
        assert_eq!(responses[0].content, json!({ "error": "Transaction failed" }));
    }

    #[tokio::test]
    async fn test_submission_error_is_reported() {
        let h = harness(MockOutcome::SendError("insufficient funds".into()));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT, "amount": "1" }));
        let (responses, callback) = recording_callback();

        let ok = h
            .action
            .handler(&runtime, &message(), None, Some(&*callback))
            .await;
        assert!(!ok);

        let responses = responses.lock().unwrap();
        assert_eq!(
            responses[0].text,
            "Error transferring QUAI: Transaction send failed: insufficient funds"
        );
        assert_eq!(
            responses[0].content,
            json!({ "error": "Transaction send failed: insufficient funds" })
        );
    }

    #[tokio::test]
    async fn test_malformed_amount_is_execution_error() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT, "amount": "lots" }));
        let (responses, callback) = recording_callback();

        assert!(!h.action.handler(&runtime, &message(), None, Some(&*callback)).await);
        assert!(responses.lock().unwrap()[0]
            .text
            .starts_with("Error transferring QUAI: invalid amount 'lots'"));
    }

    #[tokio::test]
    async fn test_amount_with_trailing_zeros_past_precision_is_sent() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(
            json!({ "recipient": RECIPIENT, "amount": "0.10000000000000000000" }),
        );
        let (responses, callback) = recording_callback();

        assert!(h.action.handler(&runtime, &message(), None, Some(&*callback)).await);

        let sent = h.connector.last_account().unwrap().sent();
        assert_eq!(sent[0].value, U256::from(100_000_000_000_000_000u64));
        assert_eq!(responses.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_is_extraction_error() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::failing("model offline");
        let (responses, callback) = recording_callback();

        assert!(!h.action.handler(&runtime, &message(), None, Some(&*callback)).await);

        let responses = responses.lock().unwrap();
        assert_eq!(
            responses[0].text,
            "Could not extract transfer details: Model generation failed: model offline"
        );
        assert_eq!(h.connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_existing_state_is_refreshed_not_recomposed() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(json!({ "recipient": RECIPIENT, "amount": "1" }));
        let state = State {
            recent_messages: "alice: pay bob".into(),
            ..State::default()
        };

        assert!(h.action.handler(&runtime, &message(), Some(state), None).await);
        assert_eq!(runtime.updated.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.composed.load(Ordering::SeqCst), 0);

        let contexts = runtime.contexts.lock().unwrap();
        assert!(contexts[0].contains("alice: pay bob"));
        assert!(!contexts[0].contains("{{recentMessages}}"));
    }

    #[tokio::test]
    async fn test_no_callback_still_returns_outcome() {
        let h = harness(MockOutcome::Receipt(1));
        let runtime = MockRuntime::new(Value::Null);
        assert!(!h.action.handler(&runtime, &message(), None, None).await);
    }
}
