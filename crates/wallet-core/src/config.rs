use chain_btc::network::BtcNetwork;
use serde::{Deserialize, Serialize};

use crate::account::{derive_account_with_config, Account};
use crate::error::WalletError;
use crate::hd_derivation::{parse_derivation_path, DEFAULT_DERIVATION_PATH};

/// Settings that feed account derivation.
///
/// Everything is passed in explicitly; nothing here reads the process
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub network: BtcNetwork,
    pub derivation_path: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: BtcNetwork::Mainnet,
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
        }
    }
}

impl WalletConfig {
    pub fn new(network: BtcNetwork) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn with_derivation_path(mut self, path: impl Into<String>) -> Self {
        self.derivation_path = path.into();
        self
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, WalletError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        parse_derivation_path(&self.derivation_path)?;
        Ok(())
    }
}

/// A reproducible test account: a known phrase and what it must derive to.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountFixture {
    pub phrase: String,
    #[serde(default)]
    pub expected_address: Option<String>,
    #[serde(default)]
    pub expected_wif: Option<String>,
}

impl std::fmt::Debug for AccountFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountFixture")
            .field("phrase", &"[REDACTED]")
            .field("expected_address", &self.expected_address)
            .field("expected_wif", &self.expected_wif.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AccountFixture {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            expected_address: None,
            expected_wif: None,
        }
    }

    /// Derive the fixture's account and check it against the expectations.
    pub fn derive(&self, config: &WalletConfig) -> Result<Account, WalletError> {
        let account = derive_account_with_config(Some(&self.phrase), config)?;

        if let Some(expected) = &self.expected_address {
            if *expected != account.address {
                return Err(WalletError::Config(format!(
                    "fixture address mismatch: expected {expected}, derived {}",
                    account.address
                )));
            }
        }
        if let Some(expected) = &self.expected_wif {
            if expected.as_str() != account.expose_private_key() {
                return Err(WalletError::Config("fixture private key mismatch".into()));
            }
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mainnet_bip44() {
        let config = WalletConfig::default();
        assert_eq!(config.network, BtcNetwork::Mainnet);
        assert_eq!(config.derivation_path, "m/44'/0'/0'/0/0");
    }

    #[test]
    fn json_missing_fields_use_defaults() {
        let config = WalletConfig::from_json_str(r#"{"network": "testnet"}"#).unwrap();
        assert_eq!(config.network, BtcNetwork::Testnet);
        assert_eq!(config.derivation_path, DEFAULT_DERIVATION_PATH);
    }

    #[test]
    fn json_overrides_path() {
        let config =
            WalletConfig::from_json_str(r#"{"derivation_path": "m/49'/0'/0'/0/3"}"#).unwrap();
        assert_eq!(config.derivation_path, "m/49'/0'/0'/0/3");
    }

    #[test]
    fn json_with_bad_path_rejected() {
        let result = WalletConfig::from_json_str(r#"{"derivation_path": "not/a/path"}"#);
        assert!(matches!(result, Err(WalletError::InvalidDerivationPath(_))));
    }

    #[test]
    fn json_with_unknown_network_rejected() {
        let result = WalletConfig::from_json_str(r#"{"network": "regtest"}"#);
        assert!(matches!(result, Err(WalletError::Config(_))));
    }

    #[test]
    fn builder_methods() {
        let config = WalletConfig::new(BtcNetwork::Signet).with_derivation_path("m/0");
        assert_eq!(config.network, BtcNetwork::Signet);
        assert_eq!(config.derivation_path, "m/0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fixture_debug_redacts_secrets() {
        let mut fixture = AccountFixture::new("abandon abandon about");
        fixture.expected_wif = Some("KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn".into());
        let debug = format!("{fixture:?}");
        assert!(!debug.contains("abandon"));
        assert!(!debug.contains("KwDiBf"));
    }
}
