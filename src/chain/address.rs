//! Address canonicalisation and Quai zone/ledger rules
//!
//! A Quai address is a 20-byte keccak address like any EVM address, but its
//! first byte selects the zone (region in the high nibble, zone in the low
//! nibble) and the top bit of its second byte selects the ledger: clear for
//! the account-based Quai ledger, set for the UTXO Qi ledger.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Network shard an address lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Cyprus1,
    Cyprus2,
    Cyprus3,
    Paxos1,
    Paxos2,
    Paxos3,
    Hydra1,
    Hydra2,
    Hydra3,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Zone::Cyprus1,
        Zone::Cyprus2,
        Zone::Cyprus3,
        Zone::Paxos1,
        Zone::Paxos2,
        Zone::Paxos3,
        Zone::Hydra1,
        Zone::Hydra2,
        Zone::Hydra3,
    ];

    /// Address prefix byte for this zone
    pub fn byte(&self) -> u8 {
        match self {
            Zone::Cyprus1 => 0x00,
            Zone::Cyprus2 => 0x01,
            Zone::Cyprus3 => 0x02,
            Zone::Paxos1 => 0x10,
            Zone::Paxos2 => 0x11,
            Zone::Paxos3 => 0x12,
            Zone::Hydra1 => 0x20,
            Zone::Hydra2 => 0x21,
            Zone::Hydra3 => 0x22,
        }
    }

    /// URL path segment used when routing RPC calls to this zone
    pub fn path(&self) -> &'static str {
        match self {
            Zone::Cyprus1 => "cyprus1",
            Zone::Cyprus2 => "cyprus2",
            Zone::Cyprus3 => "cyprus3",
            Zone::Paxos1 => "paxos1",
            Zone::Paxos2 => "paxos2",
            Zone::Paxos3 => "paxos3",
            Zone::Hydra1 => "hydra1",
            Zone::Hydra2 => "hydra2",
            Zone::Hydra3 => "hydra3",
        }
    }

    /// Zone encoded in an address, if its prefix byte names one
    pub fn of(address: &Address) -> Option<Zone> {
        let prefix = address.0[0];
        Zone::ALL.into_iter().find(|z| z.byte() == prefix)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Zone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Zone::ALL
            .into_iter()
            .find(|z| z.path().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Config(format!("Unknown zone: {}", s)))
    }
}

/// Canonicalise an address string.
///
/// Accepts `0x` followed by 40 hex digits. All-lowercase and all-uppercase
/// input is accepted as-is; mixed case must carry a valid checksum.
pub fn get_address(input: &str) -> Result<Address> {
    let hex = input
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidAddress(format!("missing 0x prefix: {}", input)))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(format!(
            "expected 40 hex characters: {}",
            input
        )));
    }

    let address = Address::from_str(input)
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", input, e)))?;

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None) != input {
        return Err(Error::InvalidAddress(format!("bad address checksum: {}", input)));
    }

    Ok(address)
}

/// True for addresses on the UTXO (Qi) ledger
pub fn is_qi_address(address: &Address) -> bool {
    address.0[1] & 0x80 != 0
}

/// True for addresses on the account-based Quai ledger
pub fn is_quai_address(address: &Address) -> bool {
    !is_qi_address(address)
}

/// True when `address` belongs to `zone` and the Quai ledger
pub fn is_valid_for_zone(address: &Address, zone: Zone) -> bool {
    address.0[0] == zone.byte() && is_quai_address(address)
}
