//! Account creation for the Bitcoin wallet utility.
//!
//! Turns a BIP-39 mnemonic (supplied or freshly generated) and a BIP-32
//! derivation path into a WIF private key and its P2SH-P2WPKH address.
//! Transaction building lives in `chain-btc`.

pub mod account;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;

pub use account::{derive_account, derive_account_with_config, Account};
pub use config::{AccountFixture, WalletConfig};
pub use error::WalletError;
pub use hd_derivation::DEFAULT_DERIVATION_PATH;
