//! JSON-RPC backed account
//!
//! Connects a local private key to a chain node through alloy's provider
//! stack. The wallet filler populates nonce, gas and chain id, signs, and
//! broadcasts; receipts are polled until the node reports inclusion.

use std::sync::Arc;
use std::time::Duration;

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest as RpcTransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::ChainConfig;
use crate::error::{Error, Result};

use super::account::{Account, ChainConnector, PendingTransaction, Receipt, TransactionRequest};

/// Creates [`RpcAccount`]s against one node endpoint
///
/// Transactions are signed and encoded in the Ethereum format. A Quai node
/// expects protobuf-encoded transactions, so against `rpc.quai.network` a
/// `send` is rejected by the node and no funds move. Point `rpc_url` at an
/// endpoint that accepts Ethereum-encoded transactions, or supply a Quai-native
/// [`ChainConnector`].
#[derive(Debug, Clone)]
pub struct RpcConnector {
    rpc_url: Url,
    poll_interval: Duration,
}

impl RpcConnector {
    /// Creates a connector for the given RPC URL.
    pub fn new(rpc_url: &str, poll_interval: Duration) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
        Ok(Self {
            rpc_url,
            poll_interval,
        })
    }

    /// Creates a connector for the configured zone endpoint.
    pub fn from_config(config: &ChainConfig) -> Result<Self> {
        Self::new(
            &config.zone_rpc_url(),
            Duration::from_millis(config.receipt_poll_interval_ms),
        )
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

impl ChainConnector for RpcConnector {
    fn connect(&self, signer: PrivateKeySigner) -> Result<Arc<dyn Account>> {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(self.rpc_url.clone())
            .erased();

        debug!("Connected account {} to {}", address, self.rpc_url);

        Ok(Arc::new(RpcAccount {
            address,
            provider,
            rpc_url: self.rpc_url.clone(),
            poll_interval: self.poll_interval,
        }))
    }
}

/// Account that signs locally and submits through a JSON-RPC node
pub struct RpcAccount {
    address: Address,
    provider: DynProvider<Ethereum>,
    rpc_url: Url,
    poll_interval: Duration,
}

impl std::fmt::Debug for RpcAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcAccount")
            .field("address", &self.address)
            .field("rpc_url", &self.rpc_url.as_str())
            .finish()
    }
}

#[async_trait]
impl Account for RpcAccount {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<PendingTransaction> {
        let tx = RpcTransactionRequest::default()
            .from(request.from)
            .to(request.to)
            .value(request.value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::TransactionSend(e.to_string()))?;

        Ok(PendingTransaction {
            hash: *pending.tx_hash(),
        })
    }

    async fn wait(&self, pending: &PendingTransaction) -> Result<Receipt> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(pending.hash)
                .await
                .map_err(|e| Error::Rpc(e.to_string()))?;

            if let Some(receipt) = receipt {
                return Ok(Receipt {
                    hash: pending.hash,
                    status: u64::from(receipt.status()),
                    block_number: receipt.block_number,
                });
            }

            debug!("Receipt for {} not available yet", pending.hash);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
