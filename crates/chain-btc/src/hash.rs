use sha2::{Digest, Sha256};

use crate::error::BtcError;

/// Double SHA-256 of `data`.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Compute the transaction id of a hex-encoded serialized transaction.
///
/// The digest is reversed into the display order used by explorers and
/// wallets. For segwit transactions this hashes whatever bytes are given,
/// so passing a witness serialization yields its wtxid.
pub fn transaction_id(tx_hex: &str) -> Result<String, BtcError> {
    let bytes = hex::decode(tx_hex).map_err(|e| BtcError::InvalidHexEncoding(e.to_string()))?;
    let mut digest = sha256d(&bytes);
    digest.reverse();
    Ok(hex::encode(digest))
}
