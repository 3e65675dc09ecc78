//! SLIP-0010 ed25519 key derivation
//!
//! The network derives signing keys along the hardened path
//! `m/44'/314159'/0'` (314159 is the registered coin type). SLIP-0010
//! ed25519 derivation is hardened-only: each step is an HMAC-SHA512 over
//! the parent key material, so the whole chain is deterministic.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};
use crate::keys::{mnemonic, strkey};

type HmacSha512 = Hmac<Sha512>;

/// Hardened derivation path: purpose 44' / coin type 314159' / account 0'
const DERIVATION_PATH: [u32; 3] = [44, 314_159, 0];

const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A wallet's signing keypair, owned by exactly one pipeline pass
///
/// The secret half is zeroized when the value is dropped.
pub struct WalletKeypair {
    signing: SigningKey,
    public_id: String,
}

impl WalletKeypair {
    /// Derive the keypair for a seed phrase
    ///
    /// Same phrase in, same keypair out - required so a crash-restarted
    /// sweep resolves every wallet to the same account.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let seed = mnemonic::seed_from_phrase(phrase)?;

        let (mut key, mut chain_code) = slip10_master(&seed[..])?;
        for &index in &DERIVATION_PATH {
            let (child_key, child_chain) = slip10_child(&key, &chain_code, index)?;
            key = child_key;
            chain_code = child_chain;
        }

        let signing = SigningKey::from_bytes(&key);
        let public_id = strkey::encode_account_id(&signing.verifying_key().to_bytes());

        Ok(Self { signing, public_id })
    }

    /// The account id (`G...`) this keypair controls
    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// Last four bytes of the public key, used as the signature hint
    pub fn signature_hint(&self) -> [u8; 4] {
        let bytes = self.signing.verifying_key().to_bytes();
        [bytes[28], bytes[29], bytes[30], bytes[31]]
    }

    /// Sign an arbitrary message (the transaction hash)
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

/// Master key from seed: HMAC-SHA512 keyed with the curve tag
fn slip10_master(seed: &[u8]) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>)> {
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;
    mac.update(seed);
    split_digest(mac)
}

/// Hardened child derivation step
fn slip10_child(
    key: &[u8; 32],
    chain_code: &[u8; 32],
    index: u32,
) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>)> {
    let hardened = index
        .checked_add(HARDENED_OFFSET)
        .ok_or_else(|| Error::KeyDerivation(format!("index out of range: {}", index)))?;

    let mut mac = HmacSha512::new_from_slice(chain_code)
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;
    mac.update(&[0u8]);
    mac.update(key);
    mac.update(&hardened.to_be_bytes());
    split_digest(mac)
}

fn split_digest(mac: HmacSha512) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>)> {
    let mut digest = mac.finalize().into_bytes();
    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&digest[..32]);
    chain_code.copy_from_slice(&digest[32..]);
    digest.as_mut_slice().zeroize();
    Ok((key, chain_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derivation_is_deterministic() {
        let a = WalletKeypair::from_phrase(PHRASE).unwrap();
        let b = WalletKeypair::from_phrase(PHRASE).unwrap();
        assert_eq!(a.public_id(), b.public_id());
        assert_eq!(
            a.verifying_key().to_bytes(),
            b.verifying_key().to_bytes()
        );
    }

    #[test]
    fn test_public_id_shape() {
        let keypair = WalletKeypair::from_phrase(PHRASE).unwrap();
        assert!(keypair.public_id().starts_with('G'));
        assert_eq!(keypair.public_id().len(), 56);
    }

    #[test]
    fn test_signature_verifies() {
        use ed25519_dalek::{Signature, Verifier};

        let keypair = WalletKeypair::from_phrase(PHRASE).unwrap();
        let message = b"payload";
        let signature = Signature::from_bytes(&keypair.sign(message));
        assert!(keypair.verifying_key().verify(message, &signature).is_ok());
    }

    #[test]
    fn test_signature_hint_matches_key_tail() {
        let keypair = WalletKeypair::from_phrase(PHRASE).unwrap();
        let key = keypair.verifying_key().to_bytes();
        assert_eq!(keypair.signature_hint(), key[28..32]);
    }

    #[test]
    fn test_invalid_phrase_is_distinguishable() {
        let result =
            WalletKeypair::from_phrase("twelve bogus words go here like so on and so forth ok");
        assert!(matches!(result, Err(Error::InvalidMnemonic(_))));
    }

    #[test]
    fn test_slip10_master_stable() {
        // SLIP-0010 ed25519 test vector 1: master key from seed 000102030405060708090a0b0c0d0e0f
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (key, chain_code) = slip10_master(&seed).unwrap();
        assert_eq!(
            hex::encode(&key[..]),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            hex::encode(&chain_code[..]),
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
    }
}
