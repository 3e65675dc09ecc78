//! Destination address resolution
//!
//! A destination string is either a plain account id (`G...`) or a
//! multiplexed id (`M...`) carrying a sub-account discriminator. Parsing is
//! a total function over the two tagged forms - no exceptional control
//! flow, one structured error for strings that are neither.

use std::fmt;

use crate::error::{Error, Result};
use crate::keys::strkey;

/// A resolved destination, constant for the whole sweep run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Plain([u8; 32]),
    Muxed { base: [u8; 32], id: u64 },
}

impl Destination {
    /// Parse a destination string into its tagged form
    ///
    /// `M...` strings that fail multiplexed decoding fall back to a plain
    /// account-id parse; only a string valid as neither is an error.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('M') {
            if let Ok((base, id)) = strkey::decode_muxed(s) {
                return Ok(Destination::Muxed { base, id });
            }
        }
        let key = strkey::decode_account_id(s)
            .map_err(|_| Error::InvalidAddress(format!("not an account id: {:?}", s)))?;
        Ok(Destination::Plain(key))
    }

    /// The underlying account the ledger credits
    pub fn base_account(&self) -> &[u8; 32] {
        match self {
            Destination::Plain(key) => key,
            Destination::Muxed { base, .. } => base,
        }
    }

    /// Sub-account discriminator, if multiplexed
    pub fn sub_id(&self) -> Option<u64> {
        match self {
            Destination::Plain(_) => None,
            Destination::Muxed { id, .. } => Some(*id),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Plain(key) => f.write_str(&strkey::encode_account_id(key)),
            Destination::Muxed { base, id } => f.write_str(&strkey::encode_muxed(base, *id)),
        }
    }
}
