use bip39::{Language, Mnemonic};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;

/// Words in a freshly generated phrase.
pub const GENERATED_WORD_COUNT: usize = 12;

/// BIP-39 seed stretching rounds.
const SEED_PBKDF2_ROUNDS: u32 = 2048;

/// Generate a new 12-word BIP-39 mnemonic (128 bits of entropy)
pub fn generate_mnemonic() -> Result<String, WalletError> {
    let mut entropy = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}

/// Parse a phrase, normalizing whitespace and Unicode form.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, WalletError> {
    Mnemonic::parse_in(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    parse_mnemonic(phrase).is_ok()
}

/// Derive the 64-byte seed from mnemonic + passphrase.
/// The seed is wiped when the returned buffer is dropped.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, WalletError> {
    let mnemonic = parse_mnemonic(phrase)?;
    let mut seed = mnemonic.to_seed(passphrase);
    let out = Zeroizing::new(seed.to_vec());
    seed.zeroize();
    Ok(out)
}

/// BIP-39 seed of an arbitrary phrase.
///
/// PBKDF2-HMAC-SHA512 over the NFKD forms of `phrase` and
/// `"mnemonic" + passphrase`. The phrase is not checked against the word
/// list or checksum, and its whitespace is kept as given.
pub fn phrase_to_seed(phrase: &str, passphrase: &str) -> Zeroizing<Vec<u8>> {
    let password: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
    let salt: Zeroizing<String> = Zeroizing::new(format!("mnemonic{passphrase}").nfkd().collect());

    let mut seed = Zeroizing::new(vec![0u8; 64]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), SEED_PBKDF2_ROUNDS, seed.as_mut_slice());
    seed
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}
