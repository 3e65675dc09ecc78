//! Mapping from network result codes to the error taxonomy
//!
//! The only place raw transaction/operation codes are inspected. Every
//! other layer works with structured [`Error`] kinds.

use crate::error::Error;
use crate::horizon::types::ResultCodes;

/// Classify a failed submission into a taxonomy kind
pub fn classify(codes: Option<&ResultCodes>, detail: &str) -> Error {
    let Some(codes) = codes else {
        return Error::SubmitRejected {
            code: "unknown".to_string(),
            detail: detail.to_string(),
        };
    };

    if let Some(tx_code) = codes.transaction.as_deref() {
        match tx_code {
            "tx_insufficient_balance" => {
                return Error::InsufficientBalance(detail.to_string());
            }
            "tx_bad_seq" => return Error::StaleSequence(detail.to_string()),
            "tx_bad_auth" | "tx_bad_auth_extra" => {
                return Error::AuthFailure(detail.to_string());
            }
            "tx_too_late" => return Error::TxExpired(detail.to_string()),
            "tx_no_source_account" => return Error::AccountNotFound(detail.to_string()),
            // tx_failed defers to the operation codes below
            "tx_failed" => {}
            other => {
                return Error::SubmitRejected {
                    code: other.to_string(),
                    detail: detail.to_string(),
                }
            }
        }
    }

    for op_code in &codes.operations {
        match op_code.as_str() {
            "op_underfunded" => return Error::InsufficientBalance(detail.to_string()),
            "op_no_destination" => return Error::DestinationInactive(detail.to_string()),
            "op_has_sub_entries" | "op_account_merge_has_sub_entries" => {
                return Error::SubEntriesPresent(detail.to_string())
            }
            "op_success" => {}
            other => {
                return Error::SubmitRejected {
                    code: other.to_string(),
                    detail: detail.to_string(),
                }
            }
        }
    }

    Error::SubmitRejected {
        code: codes
            .transaction
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        detail: detail.to_string(),
    }
}
