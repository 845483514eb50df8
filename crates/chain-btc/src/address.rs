use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::script::ScriptBuf;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{CompressedPublicKey, PrivateKey};

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// Parse a WIF-encoded private key.
pub fn parse_wif(wif: &str) -> Result<PrivateKey, BtcError> {
    PrivateKey::from_wif(wif).map_err(|e| BtcError::InvalidKey(format!("malformed WIF: {e}")))
}

/// Export a raw 32-byte secp256k1 scalar as a compressed WIF string.
pub fn secret_to_wif(secret: &[u8; 32], network: BtcNetwork) -> Result<String, BtcError> {
    let key = PrivateKey::from_slice(secret, network.to_bitcoin_network())
        .map_err(|e| BtcError::InvalidKey(format!("invalid secret key: {e}")))?;
    Ok(key.to_wif())
}

fn compressed_public_key(key: &PrivateKey) -> Result<CompressedPublicKey, BtcError> {
    let secp = Secp256k1::signing_only();
    CompressedPublicKey::from_private_key(&secp, key)
        .map_err(|e| BtcError::InvalidKey(format!("segwit requires a compressed key: {e}")))
}

/// Derive a P2SH-P2WPKH (nested SegWit) address from a compressed public key.
///
/// The P2WPKH program `OP_0 <hash160(pubkey)>` becomes the redeem script, and
/// the address is the base58check encoding of its hash160: `3...` on mainnet,
/// `2...` on testnet/signet.
pub fn pubkey_to_p2sh_p2wpkh_address(
    pubkey_bytes: &[u8; 33],
    network: BtcNetwork,
) -> Result<String, BtcError> {
    let compressed_pk = CompressedPublicKey::from_slice(pubkey_bytes).map_err(|e| {
        BtcError::InvalidPublicKey(format!("failed to parse compressed public key: {e}"))
    })?;

    let address = Address::p2shwpkh(&compressed_pk, network.to_bitcoin_network());

    Ok(address.to_string())
}

/// Derive the P2SH-P2WPKH address controlled by a WIF private key.
///
/// The network comes from the WIF version byte.
pub fn wif_to_address(wif: &str) -> Result<String, BtcError> {
    let key = parse_wif(wif)?;
    let compressed_pk = compressed_public_key(&key)?;
    Ok(Address::p2shwpkh(&compressed_pk, key.network).to_string())
}

/// Return the P2WPKH redeem script a spender reveals to satisfy the P2SH wrapper.
pub fn wif_to_redeem_script(wif: &str) -> Result<ScriptBuf, BtcError> {
    let key = parse_wif(wif)?;
    let compressed_pk = compressed_public_key(&key)?;
    Ok(ScriptBuf::new_p2wpkh(&compressed_pk.wpubkey_hash()))
}

/// Parse an address and require that it belongs to `network`.
pub fn parse_address(address: &str, network: BtcNetwork) -> Result<Address, BtcError> {
    address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| BtcError::InvalidAddress(format!("failed to parse address: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| BtcError::InvalidAddress(format!("address wrong network: {e}")))
}

/// Validate a Bitcoin address string for the given network.
///
/// Returns `true` if the address is valid for the specified network,
/// `false` if it is valid but for a different network.
pub fn validate_address(address: &str, network: BtcNetwork) -> Result<bool, BtcError> {
    let parsed = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| BtcError::InvalidAddress(format!("failed to parse address: {e}")))?;

    Ok(parsed.is_valid_for_network(network.to_bitcoin_network()))
}
