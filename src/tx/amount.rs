//! Native amount arithmetic
//!
//! All math happens in stroops, the ledger's integer fractional unit
//! (10^-7 of one coin). Decimal strings are truncated toward zero at the
//! seventh place - rounding up could spend into the reserve.

use crate::error::{Error, Result};

/// Integer amount in the ledger's fractional unit
pub type Stroops = i64;

/// Stroops per whole coin (7 decimal digits)
pub const STROOPS_PER_COIN: i64 = 10_000_000;

/// Parse a decimal amount string into stroops, rounding down
pub fn parse_amount(s: &str) -> Result<Stroops> {
    let s = s.trim();
    if s.is_empty() || s.starts_with('-') || s.starts_with('+') {
        return Err(Error::InvalidAmount(format!("not a plain decimal: {:?}", s)));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAmount(format!("bad integer part: {:?}", s)));
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAmount(format!("bad fraction part: {:?}", s)));
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| Error::AmountOverflow)?;

    // Truncate (never round up) past the seventh decimal place
    let frac_digits = &frac[..frac.len().min(7)];
    let mut frac_stroops: i64 = 0;
    if !frac_digits.is_empty() {
        frac_stroops = frac_digits.parse().map_err(|_| Error::AmountOverflow)?;
        for _ in frac_digits.len()..7 {
            frac_stroops *= 10;
        }
    }

    whole
        .checked_mul(STROOPS_PER_COIN)
        .and_then(|w| w.checked_add(frac_stroops))
        .ok_or(Error::AmountOverflow)
}

/// Format stroops as a fixed seven-decimal string, the form the network's
/// APIs expect for amounts
pub fn format_amount(stroops: Stroops) -> String {
    let sign = if stroops < 0 { "-" } else { "" };
    let abs = stroops.unsigned_abs();
    format!(
        "{}{}.{:07}",
        sign,
        abs / STROOPS_PER_COIN as u64,
        abs % STROOPS_PER_COIN as u64
    )
}
