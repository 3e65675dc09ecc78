//! Key handling - mnemonic validation, HD derivation, address encoding
//!
//! One wallet = one BIP-39 seed phrase. The signing keypair is derived
//! deterministically along the network's fixed SLIP-0010 path, so the same
//! phrase always resolves to the same account.
//!
//! # Security
//!
//! Seed material lives only for the duration of one pipeline pass and is
//! zeroized on drop. Secret keys are never logged, serialized, or sent
//! anywhere.

pub mod derivation;
pub mod mnemonic;
pub mod strkey;

pub use derivation::WalletKeypair;
