//! BIP-39 seed phrase validation and seed generation

use bip39::{Language, Mnemonic};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Validate a seed phrase and derive its 64-byte BIP-39 seed
///
/// Word count and checksum are verified against the English wordlist. A
/// malformed phrase maps to [`Error::InvalidMnemonic`] so the caller can
/// tell a corrupt wallet-list entry apart from transient network failures.
///
/// The seed is produced with an empty passphrase, matching how the target
/// wallets were created.
pub fn seed_from_phrase(phrase: &str) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = Mnemonic::parse_in(Language::English, phrase.trim())
        .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}
