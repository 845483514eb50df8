use serde::{Deserialize, Serialize};

use crate::error::BtcError;
use crate::explorer::UnspentListingEntry;

/// A previous output being spent, as supplied by the blockchain query layer.
///
/// These are trusted inputs: the builder does not check that the output is
/// unspent or that `raw_previous_transaction` hashes to `previous_tx_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// Transaction ID as a hex string (big-endian / display order).
    pub previous_tx_hash: String,
    /// Output index within the previous transaction.
    pub output_index: u32,
    /// The complete serialized previous transaction.
    #[serde(with = "hex_bytes")]
    pub raw_previous_transaction: Vec<u8>,
    /// Value in satoshis.
    pub value: u64,
}

impl UnspentOutput {
    /// Build an input from hex-encoded raw previous transaction bytes.
    pub fn from_hex(
        previous_tx_hash: impl Into<String>,
        output_index: u32,
        raw_previous_transaction_hex: &str,
        value: u64,
    ) -> Result<Self, BtcError> {
        let raw_previous_transaction = hex::decode(raw_previous_transaction_hex.trim())
            .map_err(|e| BtcError::InvalidHexEncoding(format!("raw previous transaction: {e}")))?;
        Ok(Self {
            previous_tx_hash: previous_tx_hash.into(),
            output_index,
            raw_previous_transaction,
            value,
        })
    }

    /// Join an unspent-listing entry with its separately fetched raw transaction.
    pub fn from_listing(entry: &UnspentListingEntry, raw_tx_hex: &str) -> Result<Self, BtcError> {
        Self::from_hex(
            entry.tx_hash_big_endian.clone(),
            entry.tx_output_n,
            raw_tx_hex,
            entry.value,
        )
    }
}

/// Sum of input values, or `None` on overflow.
pub fn total_value(inputs: &[UnspentOutput]) -> Option<u64> {
    inputs
        .iter()
        .try_fold(0u64, |acc, input| acc.checked_add(input.value))
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_input(value: u64) -> UnspentOutput {
        UnspentOutput {
            previous_tx_hash: "aa".repeat(32),
            output_index: 0,
            raw_previous_transaction: vec![0x02, 0x00, 0x00, 0x00],
            value,
        }
    }

    #[test]
    fn from_hex_decodes_raw_transaction() {
        let input = UnspentOutput::from_hex("ab".repeat(32), 1, "02000000", 5_000).unwrap();
        assert_eq!(input.raw_previous_transaction, vec![0x02, 0, 0, 0]);
        assert_eq!(input.output_index, 1);
        assert_eq!(input.value, 5_000);
    }

    #[test]
    fn from_hex_rejects_bad_hex() {
        let result = UnspentOutput::from_hex("ab".repeat(32), 0, "xyz", 1);
        assert!(matches!(result, Err(BtcError::InvalidHexEncoding(_))));
    }

    #[test]
    fn from_listing_copies_outpoint_and_value() {
        let entry = UnspentListingEntry {
            tx_hash_big_endian: "cd".repeat(32),
            tx_hash: None,
            tx_output_n: 3,
            script: None,
            value: 42_000,
            confirmations: Some(6),
        };
        let input = UnspentOutput::from_listing(&entry, "0100").unwrap();
        assert_eq!(input.previous_tx_hash, entry.tx_hash_big_endian);
        assert_eq!(input.output_index, 3);
        assert_eq!(input.value, 42_000);
        assert_eq!(input.raw_previous_transaction, vec![0x01, 0x00]);
    }

    #[test]
    fn total_value_sums_inputs() {
        let inputs = vec![make_input(1_000), make_input(2_500)];
        assert_eq!(total_value(&inputs), Some(3_500));
        assert_eq!(total_value(&[]), Some(0));
    }

    #[test]
    fn total_value_detects_overflow() {
        let inputs = vec![make_input(u64::MAX), make_input(1)];
        assert_eq!(total_value(&inputs), None);
    }

    #[test]
    fn serde_uses_hex_for_raw_transaction() {
        let input = make_input(7);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["raw_previous_transaction"], "02000000");
        let back: UnspentOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, input);
    }
}
