//! Error types for the sweeper

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sweeper
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Key derivation errors
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    // Address errors
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // Amount errors
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow")]
    AmountOverflow,

    // Transaction errors
    #[error("Transaction build failed: {0}")]
    TransactionBuild(String),

    // Horizon transport errors
    #[error("Horizon error: {0}")]
    Horizon(String),

    #[error("Horizon timeout after {0}ms")]
    HorizonTimeout(u64),

    // Ledger-level rejections
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Merge blocked by open subentries: {0}")]
    SubEntriesPresent(String),

    #[error("Destination account not active: {0}")]
    DestinationInactive(String),

    #[error("Signature rejected: {0}")]
    AuthFailure(String),

    #[error("Stale sequence number: {0}")]
    StaleSequence(String),

    #[error("Transaction expired before inclusion: {0}")]
    TxExpired(String),

    #[error("Submission rejected ({code}): {detail}")]
    SubmitRejected { code: String, detail: String },

    // Submission routing
    #[error("All {count} submission channels failed: {detail}")]
    AllChannelsFailed { count: usize, detail: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is transient and worth retrying on the next pass
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Horizon(_)
                | Error::HorizonTimeout(_)
                | Error::StaleSequence(_)
                | Error::TxExpired(_)
                | Error::DestinationInactive(_)
                | Error::AllChannelsFailed { .. }
        )
    }

    /// Check if this error means the wallet can never succeed without
    /// operator intervention
    pub fn is_fatal_for_wallet(&self) -> bool {
        matches!(
            self,
            Error::InvalidMnemonic(_) | Error::AccountNotFound(_) | Error::SubEntriesPresent(_)
        )
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::HorizonTimeout(0)
        } else {
            Error::Horizon(e.to_string())
        }
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
