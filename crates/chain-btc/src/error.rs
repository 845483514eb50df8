use thiserror::Error;

/// Bitcoin chain operation errors.
#[derive(Debug, Error)]
pub enum BtcError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hex encoding: {0}")]
    InvalidHexEncoding(String),

    #[error("insufficient funds: have {available} sat, need {required} sat")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("invalid fee: computed {computed} sat")]
    InvalidFee { computed: i128 },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid exchange rate: {0}")]
    InvalidExchangeRate(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("signature validation failed for input {input_index}")]
    SignatureValidationFailure { input_index: usize },

    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BtcError {
    /// Whether the error signals an internal fault rather than bad caller input.
    ///
    /// Fatal errors should abort the operation; everything else can be
    /// answered by asking the user for different inputs.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BtcError::SigningError(_) | BtcError::SignatureValidationFailure { .. }
        )
    }
}
