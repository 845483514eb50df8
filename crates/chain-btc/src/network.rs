use bitcoin::{Network, NetworkKind};
use serde::{Deserialize, Serialize};

use crate::error::BtcError;

/// Supported Bitcoin networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtcNetwork {
    #[default]
    Mainnet,
    Testnet,
    Signet,
}

impl BtcNetwork {
    /// Convert to the `bitcoin` crate's `Network` type.
    pub fn to_bitcoin_network(self) -> Network {
        match self {
            BtcNetwork::Mainnet => Network::Bitcoin,
            BtcNetwork::Testnet => Network::Testnet,
            BtcNetwork::Signet => Network::Signet,
        }
    }

    /// Recover a network from the kind embedded in a WIF key.
    ///
    /// Testnet and signet share address prefixes, so test keys map to testnet.
    pub fn from_network_kind(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::Main => BtcNetwork::Mainnet,
            NetworkKind::Test => BtcNetwork::Testnet,
        }
    }
}

impl std::fmt::Display for BtcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtcNetwork::Mainnet => write!(f, "mainnet"),
            BtcNetwork::Testnet => write!(f, "testnet"),
            BtcNetwork::Signet => write!(f, "signet"),
        }
    }
}

impl std::str::FromStr for BtcNetwork {
    type Err = BtcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "bitcoin" => Ok(BtcNetwork::Mainnet),
            "testnet" => Ok(BtcNetwork::Testnet),
            "signet" => Ok(BtcNetwork::Signet),
            other => Err(BtcError::InvalidNetwork(other.to_string())),
        }
    }
}
