use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::{deserialize, serialize_hex};
use bitcoin::hashes::Hash;
use bitcoin::psbt::{self, Psbt};
use bitcoin::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::secp256k1::{All, Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{
    ecdsa, Amount, OutPoint, PrivateKey, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::address::{parse_address, parse_wif, wif_to_address, wif_to_redeem_script};
use crate::error::BtcError;
use crate::hash::transaction_id;
use crate::network::BtcNetwork;
use crate::utxo::{total_value, UnspentOutput};

/// Empirical correction subtracted from `fee_per_byte * draft_len`.
///
/// The draft is measured in its PSBT encoding before the change output and
/// the signature data exist. The offset is only calibrated for the
/// one-input, two-output P2SH-P2WPKH shape this builder produces and must be
/// revisited if the builder ever spends a variable number of inputs.
pub const FEE_SIZE_OFFSET_SAT: u64 = 15_000;

/// A signed, finalized transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Sum of all input values, in satoshis.
    pub balance: u64,
    /// Recipient address as given by the caller.
    pub recipient: String,
    /// The sender's own address, which receives the change.
    pub change_address: String,
    /// Serialized transaction (segwit encoding), hex.
    pub hex: String,
    /// Fee in satoshis.
    pub fee: u64,
    /// `transaction_id(hex)`.
    pub hash: String,
}

/// Compute the fee for a draft whose PSBT encoding is `draft_len` bytes long.
pub fn fee_for_draft_size(fee_per_byte: u64, draft_len: usize) -> Result<u64, BtcError> {
    let computed =
        i128::from(fee_per_byte) * draft_len as i128 - i128::from(FEE_SIZE_OFFSET_SAT);
    u64::try_from(computed).map_err(|_| BtcError::InvalidFee { computed })
}

/// In-progress transaction: a PSBT plus the value of each spent output.
///
/// Outputs are kept in insertion order; the builder always adds the
/// recipient first and the change second.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    psbt: Psbt,
    input_values: Vec<Amount>,
}

impl TransactionDraft {
    /// Start an empty version 2 transaction with lock time zero.
    pub fn new() -> Result<Self, BtcError> {
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: Vec::new(),
            output: Vec::new(),
        };
        let psbt = Psbt::from_unsigned_tx(tx)
            .map_err(|e| BtcError::TransactionBuildError(format!("psbt creation failed: {e}")))?;
        Ok(Self {
            psbt,
            input_values: Vec::new(),
        })
    }

    /// Spend `input`, attaching the redeem script and the full previous
    /// transaction (required for signing non-witness prevouts).
    pub fn add_input(
        &mut self,
        input: &UnspentOutput,
        redeem_script: &ScriptBuf,
    ) -> Result<(), BtcError> {
        let txid: Txid = input
            .previous_tx_hash
            .parse()
            .map_err(|e| BtcError::TransactionBuildError(format!("invalid txid: {e}")))?;

        let previous_tx: Transaction = deserialize(&input.raw_previous_transaction).map_err(|e| {
            BtcError::TransactionBuildError(format!("invalid raw previous transaction: {e}"))
        })?;

        self.psbt.unsigned_tx.input.push(TxIn {
            previous_output: OutPoint::new(txid, input.output_index),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        });
        self.psbt.inputs.push(psbt::Input {
            non_witness_utxo: Some(previous_tx),
            redeem_script: Some(redeem_script.clone()),
            ..Default::default()
        });
        self.input_values.push(Amount::from_sat(input.value));
        Ok(())
    }

    pub fn add_output(&mut self, script_pubkey: ScriptBuf, value_sat: u64) {
        self.psbt.unsigned_tx.output.push(TxOut {
            value: Amount::from_sat(value_sat),
            script_pubkey,
        });
        self.psbt.outputs.push(psbt::Output::default());
    }

    pub fn input_count(&self) -> usize {
        self.psbt.inputs.len()
    }

    /// Length of the draft's PSBT encoding.
    pub fn serialized_len(&self) -> usize {
        self.psbt.serialize().len()
    }

    fn sighash_message(&self, input_index: usize) -> Result<Message, BtcError> {
        let redeem_script = self.psbt.inputs[input_index]
            .redeem_script
            .as_ref()
            .ok_or_else(|| {
                BtcError::SigningError(format!("input {input_index} has no redeem script"))
            })?;

        let mut sighash_cache = SighashCache::new(&self.psbt.unsigned_tx);
        let sighash = sighash_cache
            .p2wpkh_signature_hash(
                input_index,
                redeem_script,
                self.input_values[input_index],
                EcdsaSighashType::All,
            )
            .map_err(|e| BtcError::SigningError(format!("sighash computation failed: {e}")))?;

        Ok(Message::from_digest(sighash.to_byte_array()))
    }

    fn check_index(&self, input_index: usize) -> Result<(), BtcError> {
        if input_index >= self.input_count() {
            return Err(BtcError::SigningError(format!(
                "input {input_index} out of range ({} inputs)",
                self.input_count()
            )));
        }
        Ok(())
    }

    /// Sign one input with its segwit v0 sighash (SIGHASH_ALL).
    ///
    /// Nonces follow RFC 6979, so the same draft and key always produce the
    /// same signature.
    pub fn sign_input(
        &mut self,
        input_index: usize,
        key: &PrivateKey,
        secp: &Secp256k1<All>,
    ) -> Result<(), BtcError> {
        self.check_index(input_index)?;
        let msg = self.sighash_message(input_index)?;
        let signature = secp.sign_ecdsa(&msg, &key.inner);
        let public_key = key.public_key(secp);

        self.psbt.inputs[input_index]
            .partial_sigs
            .insert(public_key, ecdsa::Signature::sighash_all(signature));
        Ok(())
    }

    /// Verify every partial signature on an input against a fresh sighash.
    pub fn validate_signatures_of_input(
        &self,
        input_index: usize,
        secp: &Secp256k1<All>,
    ) -> Result<(), BtcError> {
        self.check_index(input_index)?;
        let partial_sigs = &self.psbt.inputs[input_index].partial_sigs;
        if partial_sigs.is_empty() {
            return Err(BtcError::SignatureValidationFailure { input_index });
        }

        let msg = self.sighash_message(input_index)?;
        for (public_key, signature) in partial_sigs {
            secp.verify_ecdsa(&msg, &signature.signature, &public_key.inner)
                .map_err(|_| BtcError::SignatureValidationFailure { input_index })?;
        }
        Ok(())
    }

    /// Move the signature into final P2SH-P2WPKH form.
    ///
    /// The scriptSig pushes the redeem script and the witness is
    /// `[signature, pubkey]`.
    pub fn finalize_input(&mut self, input_index: usize) -> Result<(), BtcError> {
        self.check_index(input_index)?;
        let input = &mut self.psbt.inputs[input_index];

        let (public_key, signature) = input
            .partial_sigs
            .iter()
            .next()
            .map(|(pk, sig)| (*pk, *sig))
            .ok_or_else(|| BtcError::SigningError(format!("input {input_index} is not signed")))?;
        let redeem_script = input.redeem_script.take().ok_or_else(|| {
            BtcError::SigningError(format!("input {input_index} has no redeem script"))
        })?;

        let push = PushBytesBuf::try_from(redeem_script.into_bytes())
            .map_err(|e| BtcError::SigningError(format!("redeem script too large: {e}")))?;
        let mut witness = Witness::new();
        witness.push(signature.to_vec());
        witness.push(public_key.to_bytes());

        input.final_script_sig = Some(Builder::new().push_slice(push).into_script());
        input.final_script_witness = Some(witness);
        input.partial_sigs.clear();
        Ok(())
    }

    /// Extract the network transaction. Unfinalized inputs keep empty
    /// scriptSig and witness.
    pub fn extract(self) -> Transaction {
        self.psbt.extract_tx_unchecked_fee_rate()
    }
}

/// Build and sign a single-recipient P2SH-P2WPKH transaction.
///
/// Spends every input in `inputs`, pays `value_sat` to `recipient` and sends
/// the remainder minus the fee back to the address controlled by `wif`.
/// The fee is `fee_per_byte * draft_len - FEE_SIZE_OFFSET_SAT`, where
/// `draft_len` is the PSBT size with only the recipient output present.
///
/// Only input 0 is signed. Additional inputs are added to the transaction
/// but left unsigned, which makes the result invalid for the network.
pub fn build_transaction(
    wif: &str,
    recipient: &str,
    value_sat: u64,
    inputs: &[UnspentOutput],
    fee_per_byte: u64,
) -> Result<SignedTransaction, BtcError> {
    if inputs.is_empty() {
        return Err(BtcError::TransactionBuildError("no inputs to spend".into()));
    }

    let key = parse_wif(wif)?;
    let network = BtcNetwork::from_network_kind(key.network);
    let change_address = wif_to_address(wif)?;
    let redeem_script = wif_to_redeem_script(wif)?;

    let recipient_addr = parse_address(recipient, network)?;
    let change_addr = parse_address(&change_address, network)?;

    let balance = total_value(inputs).ok_or_else(|| {
        BtcError::TransactionBuildError("input values overflow u64".into())
    })?;

    let mut draft = TransactionDraft::new()?;
    for input in inputs {
        draft.add_input(input, &redeem_script)?;
    }
    draft.add_output(recipient_addr.script_pubkey(), value_sat);

    let draft_len = draft.serialized_len();
    let fee = match fee_for_draft_size(fee_per_byte, draft_len) {
        Ok(fee) => fee,
        // An unaffordable payment is reported as such even when the fee is invalid.
        Err(e) if balance < value_sat => {
            debug!(%e, value_sat, balance, "btc_tx: fee rejected on an underfunded payment");
            return Err(BtcError::InsufficientFunds {
                required: value_sat,
                available: balance,
            });
        }
        Err(e) => return Err(e),
    };
    debug!(
        inputs = inputs.len(),
        draft_len,
        fee_per_byte,
        fee,
        balance,
        "btc_tx: fee computed"
    );

    let required = value_sat
        .checked_add(fee)
        .ok_or_else(|| BtcError::InvalidAmount(format!("{value_sat} sat plus fee overflows")))?;
    if balance < required {
        return Err(BtcError::InsufficientFunds {
            required,
            available: balance,
        });
    }
    draft.add_output(change_addr.script_pubkey(), balance - required);

    if draft.input_count() > 1 {
        warn!(
            inputs = draft.input_count(),
            "btc_tx: only input 0 is signed, remaining inputs stay unsigned"
        );
    }

    let secp = Secp256k1::new();
    draft.sign_input(0, &key, &secp)?;
    draft.validate_signatures_of_input(0, &secp)?;
    draft.finalize_input(0)?;

    let hex = serialize_hex(&draft.extract());
    let hash = transaction_id(&hex)?;
    debug!(%network, %hash, bytes = hex.len() / 2, "btc_tx: signed");

    Ok(SignedTransaction {
        balance,
        recipient: recipient.to_string(),
        change_address,
        hex,
        fee,
        hash,
    })
}
