//! Cross-crate integration tests exercising the full pipeline:
//! mnemonic -> account -> fund -> build and sign transaction -> hash.
//!
//! Funding transactions are built with the `bitcoin` crate so every input
//! is a real, decodable previous transaction paying the sender's address.

use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode::{deserialize, serialize};
use bitcoin::hashes::Hash;
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use rust_decimal::Decimal;

use chain_btc::address::parse_address;
use chain_btc::hash::transaction_id;
use chain_btc::network::BtcNetwork;
use chain_btc::units::{satoshi_to_btc, usd_to_satoshi};
use chain_btc::{build_transaction, BtcError, UnspentOutput};
use wallet_core::*;

const PHRASE_1: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PHRASE_2: &str =
    "legal winner thank year wave sausage worth useful legal winner thank yellow";

const FEE_PER_BYTE: u64 = 150;

fn funding_input(address: &str, network: BtcNetwork, value: u64, salt: u8) -> UnspentOutput {
    let script_pubkey = parse_address(address, network).unwrap().script_pubkey();
    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::new(Txid::from_byte_array([salt; 32]), 1),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![
            TxOut {
                value: Amount::from_sat(12_345),
                script_pubkey: ScriptBuf::from(vec![0x51]),
            },
            TxOut {
                value: Amount::from_sat(value),
                script_pubkey,
            },
        ],
    };
    UnspentOutput {
        previous_tx_hash: tx.compute_txid().to_string(),
        output_index: 1,
        raw_previous_transaction: serialize(&tx),
        value,
    }
}

// ─── Accounts ────────────────────────────────────────────────────────

#[test]
fn bip49_test_vector() {
    // BIP-49 reference account: testnet, first receiving address.
    let config = WalletConfig::new(BtcNetwork::Testnet).with_derivation_path("m/49'/1'/0'/0/0");
    let mut fixture = AccountFixture::new(PHRASE_1);
    fixture.expected_address = Some("2Mww8dCYPUpKHofjgcXcBCEGmniw9CoaiD2".into());
    fixture.expected_wif = Some("cULrpoZGXiuC19Uhvykx7NugygA3k86b3hmdCeyvHYQZSxojGyXJ".into());

    let account = fixture.derive(&config).unwrap();
    assert_eq!(account.address, "2Mww8dCYPUpKHofjgcXcBCEGmniw9CoaiD2");
}

#[test]
fn fixture_mismatch_is_reported() {
    let mut fixture = AccountFixture::new(PHRASE_1);
    fixture.expected_address = Some("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy".into());
    let result = fixture.derive(&WalletConfig::default());
    assert!(matches!(result, Err(WalletError::Config(_))));
}

#[test]
fn accounts_are_reproducible() {
    let config = WalletConfig::default();
    let first = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let second = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let other = derive_account_with_config(Some(PHRASE_2), &config).unwrap();

    assert_eq!(first.address, second.address);
    assert_eq!(first.expose_private_key(), second.expose_private_key());
    assert_ne!(first.address, other.address);
}

// ─── Transactions ────────────────────────────────────────────────────

#[test]
fn mnemonic_to_signed_transaction() {
    let config = WalletConfig::default();
    let from = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let to = derive_account_with_config(Some(PHRASE_2), &config).unwrap();
    let inputs = vec![funding_input(&from.address, config.network, 2_000_000, 7)];

    let signed = build_transaction(
        from.expose_private_key(),
        &to.address,
        5_000,
        &inputs,
        FEE_PER_BYTE,
    )
    .unwrap();

    assert_eq!(signed.balance, 2_000_000);
    assert_eq!(signed.recipient, to.address);
    assert_eq!(signed.change_address, from.address);
    assert_eq!(transaction_id(&signed.hex).unwrap(), signed.hash);

    let tx: Transaction = deserialize(&hex::decode(&signed.hex).unwrap()).unwrap();
    let outputs: u64 = tx.output.iter().map(|o| o.value.to_sat()).sum();
    assert_eq!(outputs + signed.fee, signed.balance);
    assert_eq!(tx.output[0].value.to_sat(), 5_000);
    assert_eq!(tx.input[0].previous_output.vout, 1);
}

#[test]
fn repeated_builds_are_byte_identical() {
    let config = WalletConfig::default();
    let from = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let to = derive_account_with_config(Some(PHRASE_2), &config).unwrap();
    let inputs = vec![funding_input(&from.address, config.network, 2_000_000, 7)];

    let build = |value| {
        build_transaction(from.expose_private_key(), &to.address, value, &inputs, FEE_PER_BYTE)
            .unwrap()
    };
    let first = build(5_000);
    assert_eq!(first, build(5_000));
    assert_ne!(first.hex, build(10_000).hex);
}

#[test]
fn testnet_pipeline() {
    let config = WalletConfig::new(BtcNetwork::Testnet);
    let from = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let to = derive_account_with_config(Some(PHRASE_2), &config).unwrap();
    let inputs = vec![funding_input(&from.address, config.network, 500_000, 3)];

    let signed = build_transaction(
        from.expose_private_key(),
        &to.address,
        20_000,
        &inputs,
        FEE_PER_BYTE,
    )
    .unwrap();
    assert!(signed.change_address.starts_with('2'));
}

#[test]
fn insufficient_funds_surfaces_through_wallet_error() {
    let config = WalletConfig::default();
    let from = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let to = derive_account_with_config(Some(PHRASE_2), &config).unwrap();
    let inputs = vec![funding_input(&from.address, config.network, 10_000, 9)];

    let err: WalletError = build_transaction(
        from.expose_private_key(),
        &to.address,
        9_000,
        &inputs,
        FEE_PER_BYTE,
    )
    .unwrap_err()
    .into();

    assert!(matches!(
        err,
        WalletError::Btc(BtcError::InsufficientFunds { available: 10_000, .. })
    ));
    assert!(!err.is_fatal());
}

// ─── Conversions ─────────────────────────────────────────────────────

#[test]
fn quarter_dollar_payment() {
    let config = WalletConfig::default();
    let from = derive_account_with_config(Some(PHRASE_1), &config).unwrap();
    let to = derive_account_with_config(Some(PHRASE_2), &config).unwrap();
    let inputs = vec![funding_input(&from.address, config.network, 1_000_000, 5)];

    let usd_per_btc = Decimal::from_str("64000").unwrap();
    let dollar = usd_to_satoshi(Decimal::ONE, usd_per_btc).unwrap();
    assert_eq!(dollar, 1_562);
    let quarter = usd_to_satoshi(Decimal::from_str("0.25").unwrap(), usd_per_btc).unwrap();
    assert_eq!(quarter, 390);

    let signed = build_transaction(
        from.expose_private_key(),
        &to.address,
        quarter,
        &inputs,
        FEE_PER_BYTE,
    )
    .unwrap();
    assert!(satoshi_to_btc(signed.fee) < Decimal::ONE);
}
