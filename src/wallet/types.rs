//! Persisted wallet record

use std::str::FromStr;

use alloy::primitives::{hex, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of a `0x`-prefixed 32-byte hex private key
pub const PRIVATE_KEY_HEX_LEN: usize = 66;

/// Wallet file contents
///
/// ```json
/// {
///   "privateKey": "0x...",
///   "address": "0x00...",
///   "createdAt": "2025-01-01T00:00:00Z"
/// }
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub private_key: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl WalletRecord {
    pub fn new(private_key: B256, address: Address) -> Self {
        Self {
            private_key: hex::encode_prefixed(private_key),
            address: address.to_checksum(None),
            created_at: Utc::now(),
        }
    }

    /// Format check: `0x` followed by 64 hex digits
    pub fn is_valid_private_key(key: &str) -> bool {
        key.len() == PRIVATE_KEY_HEX_LEN
            && key.starts_with("0x")
            && key[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Build a signer from the stored key
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        signer_from_hex(&self.private_key)
    }
}

impl std::fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRecord")
            .field("private_key", &"***")
            .field("address", &self.address)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Parse a hex private key into a signer, rejecting anything that is not a
/// valid secp256k1 scalar.
pub fn signer_from_hex(key: &str) -> Result<PrivateKeySigner> {
    if !WalletRecord::is_valid_private_key(key) {
        return Err(Error::InvalidPrivateKey(
            "expected 0x followed by 64 hex characters".to_string(),
        ));
    }
    let bytes = B256::from_str(key).map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
    PrivateKeySigner::from_bytes(&bytes).map_err(|e| Error::InvalidPrivateKey(e.to_string()))
}
