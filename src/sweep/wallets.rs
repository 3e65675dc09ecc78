//! Wallet list loading
//!
//! One seed phrase per line; blank lines skipped. The order in the file is
//! the sweep order. Phrases are not validated here - a malformed entry
//! surfaces as `InvalidMnemonic` during its own pass so one bad line never
//! blocks the rest of the list.

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

/// Load the ordered wallet list; empty or unreadable is fatal at startup
pub fn load_wallets(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "cannot read wallet list {}: {}",
            path.display(),
            e
        ))
    })?;

    let wallets: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if wallets.is_empty() {
        return Err(Error::Config(format!(
            "wallet list {} contains no entries",
            path.display()
        )));
    }

    info!("Loaded {} wallet entries", wallets.len());
    Ok(wallets)
}
