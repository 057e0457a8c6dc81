//! Mnemonic generation and HD derivation of zone addresses
//!
//! Keys follow BIP-44 under the Quai coin type: `m/44'/994'/account'/0/index`.
//! Only some children land in a given zone on the Quai ledger, so derivation
//! walks `index` upward until one does.

use alloy::primitives::{keccak256, Address, B256};
use bip39::{Language, Mnemonic};
use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv};
use bitcoin::key::Secp256k1;
use bitcoin::secp256k1::PublicKey;
use bitcoin::Network;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use crate::chain::address::is_valid_for_zone;
use crate::chain::Zone;
use crate::error::{Error, Result};

/// SLIP-44 coin type registered for Quai
pub const QUAI_COIN_TYPE: u32 = 994;

/// Upper bound on child indices tried before giving up on a zone
pub const MAX_DERIVATION_ATTEMPTS: u32 = 10_000_000;

/// A key derived for a specific zone
#[derive(Clone)]
pub struct ZoneKey {
    /// Child index under `m/44'/994'/account'/0`
    pub index: u32,
    pub private_key: B256,
    pub address: Address,
}

impl std::fmt::Debug for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneKey")
            .field("index", &self.index)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh 12-word English mnemonic from 128 bits of OS entropy.
pub fn generate_mnemonic() -> Result<Mnemonic> {
    let mut entropy = [0u8; 16];
    OsRng.fill_bytes(&mut entropy);
    Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| Error::KeyDerivation(format!("failed to generate mnemonic: {}", e)))
}

/// Address of an uncompressed secp256k1 public key (keccak of the 64-byte
/// point, last 20 bytes).
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Derive the first key under `m/44'/994'/account'/0` whose address lies in
/// `zone` on the Quai ledger.
pub fn derive_zone_key(mnemonic: &Mnemonic, account: u32, zone: Zone) -> Result<ZoneKey> {
    derive_zone_key_bounded(mnemonic, account, zone, MAX_DERIVATION_ATTEMPTS)
}

fn derive_zone_key_bounded(
    mnemonic: &Mnemonic,
    account: u32,
    zone: Zone,
    max_attempts: u32,
) -> Result<ZoneKey> {
    let seed = mnemonic.to_seed("");
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Bitcoin, &seed)
        .map_err(|e| Error::KeyDerivation(format!("failed to create master key: {}", e)))?;

    let hardened = |idx: u32| {
        ChildNumber::from_hardened_idx(idx)
            .map_err(|e| Error::KeyDerivation(format!("invalid path component {}: {}", idx, e)))
    };
    let external_chain = DerivationPath::from(vec![
        hardened(44)?,
        hardened(QUAI_COIN_TYPE)?,
        hardened(account)?,
        ChildNumber::from_normal_idx(0)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?,
    ]);

    let parent = master
        .derive_priv(&secp, &external_chain)
        .map_err(|e| Error::KeyDerivation(format!("failed to derive account node: {}", e)))?;

    for index in 0..max_attempts {
        let child = ChildNumber::from_normal_idx(index)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;
        let derived = parent
            .derive_priv(&secp, &[child])
            .map_err(|e| Error::KeyDerivation(format!("failed to derive child {}: {}", index, e)))?;

        let public_key = PublicKey::from_secret_key(&secp, &derived.private_key);
        let address = address_from_public_key(&public_key);

        if is_valid_for_zone(&address, zone) {
            debug!("Found {} address at index {}", zone, index);
            return Ok(ZoneKey {
                index,
                private_key: B256::from(derived.private_key.secret_bytes()),
                address,
            });
        }
    }

    Err(Error::ZoneAddressNotFound {
        zone: zone.to_string(),
        attempts: max_attempts,
    })
}
