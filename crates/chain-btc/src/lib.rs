//! Bitcoin chain support for the wallet utility.
//!
//! Provides P2SH-wrapped P2WPKH address and redeem script derivation,
//! single-recipient transaction building and signing, transaction id hashing,
//! satoshi/BTC/USD conversion, and the data models exchanged with block
//! explorer collaborators.

pub mod address;
pub mod error;
pub mod explorer;
pub mod hash;
pub mod network;
pub mod transaction;
pub mod units;
pub mod utxo;

pub use error::BtcError;
pub use transaction::{build_transaction, SignedTransaction};
pub use utxo::UnspentOutput;
