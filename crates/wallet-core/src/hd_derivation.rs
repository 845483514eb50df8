use bip32::{DerivationPath, XPrv};
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::error::WalletError;

/// BIP-44 path of the first receiving key of the first Bitcoin account.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/0'/0'/0/0";

/// Parse "m/44'/0'/0'/0/0" into a BIP-32 path.
///
/// Hardened segments may be written with `'`, `h` or `H`.
pub fn parse_derivation_path(path: &str) -> Result<DerivationPath, WalletError> {
    let normalized: String = path
        .trim()
        .split('/')
        .map(|component| {
            match component.strip_suffix('h').or_else(|| component.strip_suffix('H')) {
                Some(index) => format!("{index}'"),
                None => component.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    normalized
        .parse()
        .map_err(|e: bip32::Error| WalletError::InvalidDerivationPath(format!("{path}: {e}")))
}

/// Derive a secp256k1 private key from seed along `path` using BIP-32
pub fn derive_secp256k1_key(seed: &[u8], path: &str) -> Result<DerivedKey, WalletError> {
    let parsed = parse_derivation_path(path)?;

    let xprv = XPrv::derive_from_path(seed, &parsed).map_err(|e| match e {
        bip32::Error::Depth | bip32::Error::ChildNumber => {
            WalletError::InvalidDerivationPath(format!("{path}: {e}"))
        }
        other => WalletError::DerivationFailed(other.to_string()),
    })?;

    let mut private_key_bytes: [u8; 32] = xprv.to_bytes().into();
    let signing_key = SigningKey::from_bytes(&private_key_bytes.into())
        .map_err(|e| WalletError::DerivationFailed(e.to_string()));
    let derived = signing_key.and_then(|signing_key| {
        let public_key_compressed: [u8; 33] = signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .try_into()
            .map_err(|_| WalletError::DerivationFailed("Invalid public key length".into()))?;

        Ok(DerivedKey {
            private_key: private_key_bytes,
            public_key_compressed,
            derivation_path: parsed.to_string(),
        })
    });

    private_key_bytes.zeroize();
    derived
}

/// Derived secp256k1 key. The private scalar is wiped on drop.
pub struct DerivedKey {
    pub private_key: [u8; 32],
    pub public_key_compressed: [u8; 33],
    pub derivation_path: String,
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
