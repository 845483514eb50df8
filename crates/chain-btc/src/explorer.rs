//! Typed models for the data exchanged with block explorer and price services.
//!
//! Fetching is done by collaborators outside this crate; these types only
//! describe the JSON they hand over and the receipt returned after a
//! broadcast. Fields that some responses omit are `Option`.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BtcError;
use crate::hash::transaction_id;

/// Fallback message when a broadcast returns an empty body.
pub const BROADCAST_FALLBACK_MSG: &str = "Something went wrong";

/// Parse a JSON response body into one of the models below.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, BtcError> {
    serde_json::from_str(body).map_err(|e| BtcError::InvalidResponse(e.to_string()))
}

// ─── Unspent outputs ─────────────────────────────────────────────────

/// Response of the unspent-outputs query for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentListing {
    #[serde(default)]
    pub notice: Option<String>,
    pub unspent_outputs: Vec<UnspentListingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentListingEntry {
    /// Txid in display order; this is what the builder expects.
    pub tx_hash_big_endian: String,
    /// Txid in internal byte order.
    #[serde(default)]
    pub tx_hash: Option<String>,
    pub tx_output_n: u32,
    /// Locking script, hex.
    #[serde(default)]
    pub script: Option<String>,
    /// Value in satoshis.
    pub value: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
}

// ─── Fees ────────────────────────────────────────────────────────────

/// Recommended fee rates, in satoshis per byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFees {
    pub fastest_fee: u64,
    pub half_hour_fee: u64,
    pub hour_fee: u64,
}

impl RecommendedFees {
    /// The rate the wallet spends with.
    pub fn fee_per_byte(&self) -> u64 {
        self.half_hour_fee
    }
}

// ─── Prices ──────────────────────────────────────────────────────────

/// Exchange ticker keyed by currency. Only USD is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(rename = "USD")]
    pub usd: TickerQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerQuote {
    /// 15 minute delayed market price.
    #[serde(rename = "15m", with = "rust_decimal::serde::float")]
    pub delayed_15m: Decimal,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Ticker {
    /// USD per BTC, as used by the unit conversions.
    pub fn usd_per_btc(&self) -> Decimal {
        self.usd.delayed_15m
    }
}

// ─── Address history ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHistory {
    pub hash160: String,
    pub address: String,
    pub n_tx: u64,
    pub total_received: u64,
    pub total_sent: u64,
    pub final_balance: u64,
    #[serde(default)]
    pub txs: Vec<Tx>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub hash: String,
    pub ver: u32,
    #[serde(default)]
    pub inputs: Vec<Input>,
    #[serde(default)]
    pub out: Vec<Out>,
    #[serde(default)]
    pub weight: Option<u64>,
    /// Absent while unconfirmed.
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_index: Option<u64>,
    #[serde(default)]
    pub relayed_by: Option<String>,
    pub lock_time: u32,
    /// Net effect on the queried address, in satoshis.
    #[serde(default)]
    pub result: i64,
    pub size: u64,
    pub time: u64,
    pub tx_index: u64,
    pub vin_sz: u32,
    pub vout_sz: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub sequence: u32,
    #[serde(default)]
    pub witness: String,
    /// Absent for coinbase inputs.
    #[serde(default)]
    pub prev_out: Option<PrevOut>,
    #[serde(default)]
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevOut {
    pub spent: bool,
    #[serde(default)]
    pub spending_outpoints: Vec<SpendingOutpoint>,
    pub tx_index: u64,
    #[serde(rename = "type")]
    pub kind: u32,
    /// Absent for non-standard scripts.
    #[serde(default)]
    pub addr: Option<String>,
    pub value: u64,
    pub n: u32,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Out {
    pub spent: bool,
    #[serde(default)]
    pub spending_outpoints: Vec<SpendingOutpoint>,
    pub tx_index: u64,
    #[serde(rename = "type")]
    pub kind: u32,
    #[serde(default)]
    pub addr: Option<String>,
    pub value: u64,
    pub n: u32,
    pub script: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingOutpoint {
    pub tx_index: u64,
    pub n: u32,
}

// ─── Broadcast ───────────────────────────────────────────────────────

/// Outcome of handing a signed transaction to a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReceipt {
    pub msg: String,
    pub hash: String,
    pub status: u16,
    pub status_text: String,
}

impl BroadcastReceipt {
    /// Build a receipt for `tx_hex`; the hash is always recomputed locally.
    pub fn new(
        tx_hex: &str,
        status: u16,
        status_text: impl Into<String>,
        body: Option<String>,
    ) -> Result<Self, BtcError> {
        let msg = body
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| BROADCAST_FALLBACK_MSG.to_string());
        Ok(Self {
            msg,
            hash: transaction_id(tx_hex)?,
            status,
            status_text: status_text.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
