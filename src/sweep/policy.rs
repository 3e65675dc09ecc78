//! Spendable-amount policies
//!
//! Two interchangeable modes: drain everything above a reserve with a
//! bounded payment, or merge the whole account away. Integer stroop
//! arithmetic only - truncation happened at parse time, and checked
//! subtraction keeps the reserve untouchable.

use std::fmt;

use crate::tx::amount::{format_amount, Stroops};

/// Deployment-selected sweep mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepMode {
    /// Leave `reserve` behind, send the rest net of fee
    DrainAbove { reserve: Stroops },
    /// Close the account entirely; the operation kind moves the balance
    MergeAll,
}

/// Why a wallet was skipped this pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BelowReserve,
    CannotCoverFee,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BelowReserve => f.write_str("balance at or below reserve plus fee"),
            SkipReason::CannotCoverFee => f.write_str("balance cannot cover the fee"),
        }
    }
}

/// Output of the amount policy, immutable once computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountDecision {
    /// Send exactly this many stroops
    Transfer(Stroops),
    /// Merge the account; no explicit amount exists
    Merge,
    Skip(SkipReason),
}

impl SweepMode {
    /// Decide what to move given a fresh balance and the current fee
    pub fn decide(&self, balance: Stroops, fee: Stroops) -> AmountDecision {
        match self {
            SweepMode::DrainAbove { reserve } => {
                let spendable = balance
                    .checked_sub(*reserve)
                    .and_then(|rest| rest.checked_sub(fee))
                    .unwrap_or(0);
                if spendable <= 0 {
                    AmountDecision::Skip(SkipReason::BelowReserve)
                } else {
                    AmountDecision::Transfer(spendable)
                }
            }
            SweepMode::MergeAll => {
                if balance < fee {
                    AmountDecision::Skip(SkipReason::CannotCoverFee)
                } else {
                    AmountDecision::Merge
                }
            }
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepMode::DrainAbove { reserve } => {
                write!(f, "drain above {}", format_amount(*reserve))
            }
            SweepMode::MergeAll => f.write_str("merge all"),
        }
    }
}
