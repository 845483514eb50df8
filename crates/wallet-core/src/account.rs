use chain_btc::address::{secret_to_wif, wif_to_address};
use chain_btc::network::BtcNetwork;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::hd_derivation::derive_secp256k1_key;
use crate::mnemonic::{generate_mnemonic, phrase_to_seed, validate_mnemonic};

/// A derived wallet account. Immutable once built.
///
/// `Debug` output redacts the private key and the mnemonic.
#[derive(Debug)]
pub struct Account {
    /// P2SH-P2WPKH address.
    pub address: String,
    private_key: SecretString,
    mnemonic: SecretString,
    pub path: String,
    pub network: BtcNetwork,
}

impl Account {
    /// The private key in wallet import format.
    pub fn expose_private_key(&self) -> &str {
        self.private_key.expose_secret()
    }

    pub fn expose_mnemonic(&self) -> &str {
        self.mnemonic.expose_secret()
    }
}

/// Derive an account from `phrase` at `path`.
///
/// An absent or empty phrase generates a new 12-word mnemonic. A supplied
/// phrase is used as given: it is not checked against the BIP-39 word list
/// or checksum before seeding. The seed uses no BIP-39 passphrase.
pub fn derive_account(
    phrase: Option<&str>,
    path: &str,
    network: BtcNetwork,
) -> Result<Account, WalletError> {
    let mnemonic = match phrase.filter(|p| !p.is_empty()) {
        Some(p) => {
            if !validate_mnemonic(p) {
                warn!("phrase is not a valid BIP-39 mnemonic, deriving from it anyway");
            }
            p.to_string()
        }
        None => {
            debug!("no phrase supplied, generating a new mnemonic");
            generate_mnemonic()?
        }
    };

    let seed = phrase_to_seed(&mnemonic, "");
    let key = derive_secp256k1_key(&seed, path)?;
    let private_key = secret_to_wif(&key.private_key, network)?;
    let address = wif_to_address(&private_key)?;

    info!(%address, path = %key.derivation_path, %network, "account derived");

    Ok(Account {
        address,
        private_key: SecretString::from(private_key),
        mnemonic: SecretString::from(mnemonic),
        path: key.derivation_path.clone(),
        network,
    })
}

/// Derive an account using the network and path from `config`.
pub fn derive_account_with_config(
    phrase: Option<&str>,
    config: &WalletConfig,
) -> Result<Account, WalletError> {
    derive_account(phrase, &config.derivation_path, config.network)
}
