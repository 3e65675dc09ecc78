//! Horizon JSON records and the domain snapshot they produce

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::tx::amount::{self, Stroops};

/// Point-in-time account snapshot
///
/// Fetched fresh per wallet pass and single-use: the sequence number is
/// only valid for the one envelope built immediately after loading.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub account_id: String,
    /// Native balance in stroops
    pub balance: Stroops,
    pub sequence: i64,
    pub subentry_count: u32,
}

/// Raw Horizon account record
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub sequence: String,
    #[serde(default)]
    pub subentry_count: u32,
    pub balances: Vec<BalanceLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceLine {
    pub balance: String,
    pub asset_type: String,
}

impl AccountRecord {
    /// Reduce the raw record to the snapshot the pipeline consumes
    pub fn into_state(self, account_id: &str) -> Result<AccountState> {
        let native = self
            .balances
            .iter()
            .find(|line| line.asset_type == "native")
            .ok_or_else(|| Error::Horizon(format!("no native balance line for {}", account_id)))?;

        Ok(AccountState {
            account_id: account_id.to_string(),
            balance: amount::parse_amount(&native.balance)?,
            sequence: self
                .sequence
                .parse()
                .map_err(|_| Error::Horizon(format!("bad sequence: {:?}", self.sequence)))?,
            subentry_count: self.subentry_count,
        })
    }
}

/// Horizon fee stats (only the field the sweeper uses)
#[derive(Debug, Clone, Deserialize)]
pub struct FeeStats {
    pub last_ledger_base_fee: String,
}

/// Successful synchronous submission response
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub hash: String,
    /// Present on synchronous submission; false means the network sequenced
    /// the call but rejected the transaction
    pub successful: Option<bool>,
}

/// Horizon problem document returned on failed submissions
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    pub extras: Option<ProblemExtras>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProblemExtras {
    pub result_codes: Option<ResultCodes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultCodes {
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}
