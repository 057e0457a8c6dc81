//! Wallet bootstrap and memoised account access
//!
//! The first call to [`WalletStore::get_account`] loads the wallet file, or
//! generates and persists a new zone key when the file is missing or unusable.
//! Later calls return the cached account without touching the filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy::signers::local::PrivateKeySigner;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::chain::{Account, ChainConnector, Zone};
use crate::config::Config;
use crate::error::{Error, Result};

use super::derive::{derive_zone_key, generate_mnemonic};
use super::types::{signer_from_hex, WalletRecord};

/// HD account used for the agent wallet
const WALLET_ACCOUNT_INDEX: u32 = 0;

/// Lazily initialised single-address wallet
pub struct WalletStore {
    path: PathBuf,
    zone: Zone,
    connector: Arc<dyn ChainConnector>,
    account: OnceCell<Arc<dyn Account>>,
}

impl WalletStore {
    pub fn new(path: impl Into<PathBuf>, zone: Zone, connector: Arc<dyn ChainConnector>) -> Self {
        Self {
            path: path.into(),
            zone,
            connector,
            account: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config, connector: Arc<dyn ChainConnector>) -> Self {
        Self::new(&config.wallet.path, config.chain.zone, connector)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Resolve the agent account, loading or creating the wallet on first use.
    ///
    /// Concurrent first callers share one in-flight initialisation. A failed
    /// initialisation leaves the store empty so a later call can retry.
    pub async fn get_account(&self) -> Result<Arc<dyn Account>> {
        let account = self
            .account
            .get_or_try_init(|| async {
                let (signer, _record) = load_or_generate(&self.path, self.zone).await?;
                self.connector.connect(signer)
            })
            .await?;
        Ok(Arc::clone(account))
    }
}

/// Load the wallet at `path`, or generate and persist a new one for `zone`.
///
/// A missing, unreadable or malformed file is replaced, never reported.
pub async fn load_or_generate(path: &Path, zone: Zone) -> Result<(PrivateKeySigner, WalletRecord)> {
    match read_wallet(path).await {
        Ok((signer, record)) => {
            info!("Loaded existing Quai wallet: {}", record.address);
            return Ok((signer, record));
        }
        Err(reason) => info!("{}; generating a new wallet", reason),
    }

    let key = tokio::task::spawn_blocking(move || {
        let mnemonic = generate_mnemonic()?;
        derive_zone_key(&mnemonic, WALLET_ACCOUNT_INDEX, zone)
    })
    .await
    .map_err(|e| Error::Internal(format!("key derivation task failed: {}", e)))??;

    let signer = PrivateKeySigner::from_bytes(&key.private_key)
        .map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
    let record = WalletRecord::new(key.private_key, key.address);

    write_wallet(path, &record).await?;
    info!("Generated and saved new Quai wallet: {}", record.address);

    Ok((signer, record))
}

/// Read and check the wallet file, returning why it can't be used otherwise
async fn read_wallet(path: &Path) -> std::result::Result<(PrivateKeySigner, WalletRecord), String> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(format!("No wallet file at {}", path.display()))
        }
        Err(e) => return Err(format!("Wallet file {} unreadable: {}", path.display(), e)),
    };

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Wallet file {} is not valid JSON: {}", path.display(), e))?;

    let private_key = value
        .get("privateKey")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("Wallet file {} has no privateKey", path.display()))?;

    let signer = signer_from_hex(private_key)
        .map_err(|e| format!("Wallet file {} holds an unusable key: {}", path.display(), e))?;

    let address = signer.address().to_checksum(None);
    let record = match serde_json::from_value::<WalletRecord>(value.clone()) {
        Ok(record) => {
            if !record.address.eq_ignore_ascii_case(&address) {
                warn!(
                    "Stored address {} does not match key, using {}",
                    record.address, address
                );
            }
            WalletRecord { address, ..record }
        }
        Err(_) => WalletRecord {
            private_key: private_key.to_string(),
            address,
            created_at: chrono::Utc::now(),
        },
    };

    Ok((signer, record))
}

async fn write_wallet(path: &Path, record: &WalletRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::Io(format!("failed to create {}: {}", parent.display(), e))
        })?;
    }

    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::Io(format!("failed to write {}: {}", path.display(), e)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| Error::Io(format!("failed to restrict {}: {}", path.display(), e)))?;
    }

    Ok(())
}
