//! Horizon API access
//!
//! The ledger network is an opaque remote service with three calls this
//! system needs: load an account snapshot, fetch the recommended base fee,
//! and submit a signed envelope. Everything else Horizon offers is out of
//! scope.

pub mod client;
pub mod result_codes;
pub mod types;

pub use client::{HorizonClient, Ledger};
pub use types::AccountState;
