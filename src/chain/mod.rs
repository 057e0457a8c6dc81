//! Chain SDK seam
//!
//! Everything the actions need from the chain lives behind this module:
//! address canonicalisation, unit scaling, and the [`Account`] trait that
//! submits transfers and waits for receipts.
//!
//! ```text
//! ChainConnector ──connect(key)──▶ Account ──send_transaction──▶ PendingTransaction
//!                                     └────────wait────────────▶ Receipt
//! ```

pub mod account;
pub mod address;
pub mod rpc;
pub mod units;

pub use account::{
    Account, ChainConnector, PendingTransaction, Receipt, TransactionRequest,
    RECEIPT_STATUS_SUCCESS,
};
pub use address::{get_address, is_quai_address, Zone};
pub use rpc::{RpcAccount, RpcConnector};
pub use units::{format_units, parse_units, QUAI_DECIMALS};

// Re-export alloy primitives used in the public API.
pub use alloy::primitives::{Address, TxHash, U256};
