//! Agent wallet
//!
//! A single persisted key whose address lies in the configured zone.
//!
//! ```text
//! quai_wallet.json ──load──► WalletRecord ──signer──► ChainConnector ──► Account
//!        ▲                                                                   │
//!        └──write (0600)── generate_mnemonic → derive_zone_key               │
//!                                                  WalletStore (OnceCell) ◄──┘
//! ```

pub mod derive;
pub mod store;
pub mod types;

pub use derive::{derive_zone_key, generate_mnemonic, ZoneKey, MAX_DERIVATION_ATTEMPTS, QUAI_COIN_TYPE};
pub use store::{load_or_generate, WalletStore};
pub use types::WalletRecord;
