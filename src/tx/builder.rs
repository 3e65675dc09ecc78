//! Transaction building and signing
//!
//! Builds exactly one of two operation shapes against a freshly loaded
//! account snapshot, then signs it for the configured network. Building is
//! pure: the expiry instant is an input, so identical inputs produce
//! byte-identical unsigned transactions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::horizon::AccountState;
use crate::keys::{strkey, WalletKeypair};
use crate::tx::address::Destination;
use crate::tx::amount::Stroops;
use crate::tx::xdr::XdrWriter;

// XDR union discriminants
const ENVELOPE_TYPE_TX: u32 = 2;
const KEY_TYPE_ED25519: u32 = 0;
const KEY_TYPE_MUXED_ED25519: u32 = 0x100;
const PRECOND_TIME: u32 = 1;
const MEMO_NONE: u32 = 0;
const ASSET_TYPE_NATIVE: u32 = 0;
const OP_PAYMENT: u32 = 1;
const OP_ACCOUNT_MERGE: u32 = 8;

/// Builds and signs envelopes for one network (passphrase fixed at startup)
pub struct TransactionBuilder {
    network_id: [u8; 32],
}

impl TransactionBuilder {
    pub fn new(network_passphrase: &str) -> Self {
        let network_id = Sha256::digest(network_passphrase.as_bytes()).into();
        Self { network_id }
    }

    /// Build a bounded native-asset payment
    pub fn build_payment(
        &self,
        source: &AccountState,
        destination: &Destination,
        amount: Stroops,
        fee: u32,
        valid_until: u64,
    ) -> Result<UnsignedTransaction> {
        if amount <= 0 {
            return Err(Error::TransactionBuild(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        let mut body = XdrWriter::new();
        body.put_u32(OP_PAYMENT);
        put_destination(&mut body, destination);
        body.put_u32(ASSET_TYPE_NATIVE);
        body.put_i64(amount);

        self.assemble(source, body, fee, valid_until)
    }

    /// Build a full account merge (the amount is the whole balance by
    /// construction of the operation kind)
    pub fn build_merge(
        &self,
        source: &AccountState,
        destination: &Destination,
        fee: u32,
        valid_until: u64,
    ) -> Result<UnsignedTransaction> {
        let mut body = XdrWriter::new();
        body.put_u32(OP_ACCOUNT_MERGE);
        put_destination(&mut body, destination);

        self.assemble(source, body, fee, valid_until)
    }

    fn assemble(
        &self,
        source: &AccountState,
        op_body: XdrWriter,
        fee: u32,
        valid_until: u64,
    ) -> Result<UnsignedTransaction> {
        let source_key = strkey::decode_account_id(&source.account_id)?;
        let sequence = source
            .sequence
            .checked_add(1)
            .ok_or_else(|| Error::TransactionBuild("sequence number exhausted".into()))?;

        let mut tx = XdrWriter::new();
        // source account (plain ed25519)
        tx.put_u32(KEY_TYPE_ED25519);
        tx.put_opaque_fixed(&source_key);
        tx.put_u32(fee);
        tx.put_i64(sequence);
        // time-bound preconditions: valid from genesis until the expiry
        tx.put_u32(PRECOND_TIME);
        tx.put_u64(0);
        tx.put_u64(valid_until);
        tx.put_u32(MEMO_NONE);
        // one operation, no per-op source override
        tx.put_u32(1);
        tx.put_u32(0);
        tx.extend(&op_body);
        // ext
        tx.put_u32(0);

        Ok(UnsignedTransaction {
            tx_xdr: tx.into_bytes(),
            network_id: self.network_id,
        })
    }
}

fn put_destination(w: &mut XdrWriter, destination: &Destination) {
    match destination {
        Destination::Plain(key) => {
            w.put_u32(KEY_TYPE_ED25519);
            w.put_opaque_fixed(key);
        }
        Destination::Muxed { base, id } => {
            w.put_u32(KEY_TYPE_MUXED_ED25519);
            w.put_u64(*id);
            w.put_opaque_fixed(base);
        }
    }
}

/// An assembled, not-yet-signed transaction
pub struct UnsignedTransaction {
    tx_xdr: Vec<u8>,
    network_id: [u8; 32],
}

impl UnsignedTransaction {
    /// Raw transaction XDR (without envelope framing or signatures)
    pub fn bytes(&self) -> &[u8] {
        &self.tx_xdr
    }

    /// Network-bound signature payload hash
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.network_id);
        hasher.update(ENVELOPE_TYPE_TX.to_be_bytes());
        hasher.update(&self.tx_xdr);
        hasher.finalize().into()
    }

    /// Sign and wrap into the serialized envelope form the network accepts
    pub fn sign(self, keypair: &WalletKeypair) -> SignedEnvelope {
        let hash = self.hash();
        let signature = keypair.sign(&hash);

        let mut envelope = XdrWriter::new();
        envelope.put_u32(ENVELOPE_TYPE_TX);
        envelope.put_opaque_fixed(&self.tx_xdr);
        // one decorated signature: key hint + signature bytes
        envelope.put_u32(1);
        envelope.put_opaque_fixed(&keypair.signature_hint());
        envelope.put_opaque_var(&signature);

        SignedEnvelope {
            xdr_base64: BASE64.encode(envelope.as_bytes()),
            hash: hex::encode(hash),
        }
    }
}

/// A signed, single-use envelope ready for submission
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    /// Base64-encoded envelope XDR, the form submission endpoints take
    pub xdr_base64: String,
    /// Hex transaction hash (stable id for logs and explorer links)
    pub hash: String,
}
