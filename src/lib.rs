//! Quai Agent Library
//!
//! Send and receive native QUAI through conversational agent actions, backed
//! by a single persisted zone wallet.

pub mod actions;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod runtime;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use actions::{quai_plugin, Action, Plugin};
pub use config::Config;
pub use error::{ActionError, Error, Result};
pub use wallet::WalletStore;
