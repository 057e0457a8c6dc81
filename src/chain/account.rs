//! Signing account abstraction
//!
//! The handlers only ever see an [`Account`]: something with an address that
//! can submit a value transfer and wait for its receipt. How the transaction
//! is encoded, signed and broadcast is the chain SDK's business.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use crate::error::Result;

/// Receipt status reported for a successful transaction
pub const RECEIPT_STATUS_SUCCESS: u64 = 1;

/// Native-coin transfer, built fresh per handler call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Recipient address
    pub to: Address,
    /// Amount in base units
    pub value: U256,
    /// Sender address
    pub from: Address,
}

/// A submitted transaction awaiting inclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
}

/// Inclusion record for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub hash: TxHash,
    /// 1 = success, 0 = reverted
    pub status: u64,
    pub block_number: Option<u64>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == RECEIPT_STATUS_SUCCESS
    }
}

/// A signing identity bound to one key and one address
#[async_trait]
pub trait Account: Send + Sync {
    /// On-chain address of this account
    fn address(&self) -> Address;

    /// Sign and broadcast a transfer
    async fn send_transaction(&self, request: TransactionRequest) -> Result<PendingTransaction>;

    /// Wait until the transaction is included and return its receipt
    async fn wait(&self, pending: &PendingTransaction) -> Result<Receipt>;
}

/// Binds a private key to a chain connection
pub trait ChainConnector: Send + Sync {
    fn connect(&self, signer: PrivateKeySigner) -> Result<Arc<dyn Account>>;
}
