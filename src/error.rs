//! Error types for the Quai agent plugin

use alloy::primitives::TxHash;
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the plugin
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Wallet errors
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("No {zone} address found after {attempts} derivation attempts")]
    ZoneAddressNotFound { zone: String, attempts: u32 },

    // Chain errors
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    // Agent runtime errors
    #[error("Model generation failed: {0}")]
    Model(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Failure of a single action invocation, as reported back to the user.
///
/// Every variant is terminal for the invocation; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// State composition or model generation produced no usable intent
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The generated intent does not have the expected shape
    #[error("invalid transfer content")]
    Validation,

    /// The recipient does not canonicalise to a Quai ledger address
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Wallet resolution, amount scaling or submission failed
    #[error("{0}")]
    Execution(String),

    /// The transaction was included but its receipt reports failure
    #[error("transaction {0} failed on chain")]
    OnChainFailure(TxHash),
}

impl ActionError {
    /// Human-readable text for the result callback
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Extraction(reason) => {
                format!("Could not extract transfer details: {}", reason)
            }
            ActionError::Validation => {
                "Not enough information to transfer QUAI. Please provide recipient and amount."
                    .to_string()
            }
            ActionError::InvalidRecipient(recipient) => {
                format!("Invalid recipient address: {}", recipient)
            }
            ActionError::Execution(message) => format!("Error transferring QUAI: {}", message),
            ActionError::OnChainFailure(hash) => {
                format!("Transfer failed. Transaction hash: {}", hash)
            }
        }
    }

    /// Structured payload for the result callback
    pub fn payload(&self) -> Value {
        let error = match self {
            ActionError::Extraction(reason) => reason.clone(),
            ActionError::Validation => "Invalid transfer content".to_string(),
            ActionError::InvalidRecipient(_) => "Invalid recipient address".to_string(),
            ActionError::Execution(message) => message.clone(),
            ActionError::OnChainFailure(_) => "Transaction failed".to_string(),
        };
        json!({ "error": error })
    }
}

impl From<Error> for ActionError {
    fn from(e: Error) -> Self {
        ActionError::Execution(e.to_string())
    }
}
