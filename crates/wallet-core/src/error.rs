use chain_btc::error::BtcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Btc(#[from] BtcError),
}

impl WalletError {
    /// Whether the failure is an internal fault the caller should not retry
    /// with different input.
    pub fn is_fatal(&self) -> bool {
        match self {
            WalletError::Btc(e) => e.is_fatal(),
            WalletError::DerivationFailed(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Config(e.to_string())
    }
}
