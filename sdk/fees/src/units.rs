//! Base-unit conversions and display helpers.

use crate::AmountError;

/// DC and the deposit token both use 6 decimals.
pub const DC_DECIMALS: u32 = 6;

/// Whole DC to base units, saturating.
pub fn to_base_units(whole: u64) -> u64 {
    whole.saturating_mul(10u64.pow(DC_DECIMALS))
}

/// Formats base units as a fixed-point string rounded (half up) to
/// `display_decimals` places. Saturates instead of overflowing.
pub fn format_balance(base: u128, decimals: u32, display_decimals: u32) -> String {
    let scaled = if display_decimals >= decimals {
        base.saturating_mul(pow10(display_decimals - decimals).unwrap_or(u128::MAX))
    } else {
        match pow10(decimals - display_decimals) {
            Some(divisor) => base / divisor + u128::from(base % divisor >= divisor / 2 + divisor % 2),
            // divisor beyond u128: every base rounds to zero
            None => 0,
        }
    };

    if display_decimals == 0 {
        return scaled.to_string();
    }

    let (whole, frac) = match pow10(display_decimals) {
        Some(unit) => (scaled / unit, scaled % unit),
        None => (0, scaled),
    };
    format!("{}.{:0width$}", whole, frac, width = display_decimals as usize)
}

fn pow10(exp: u32) -> Option<u128> {
    10u128.checked_pow(exp)
}

/// Parses a decimal string into base units. Digits past `decimals` are
/// dropped (floor), matching how amounts are entered in the UI.
pub fn parse_amount(input: &str, decimals: u32) -> Result<u64, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Invalid(input.to_string()));
    }

    let unit = 10u64.checked_pow(decimals).ok_or(AmountError::Overflow)?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| AmountError::Overflow)?
    };

    let kept = &frac[..frac.len().min(decimals as usize)];
    let frac_units = if kept.is_empty() {
        0
    } else {
        let padding = 10u64.pow(decimals - kept.len() as u32);
        kept.parse::<u64>().map_err(|_| AmountError::Overflow)? * padding
    };

    whole_units
        .checked_mul(unit)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or(AmountError::Overflow)
}

/// True when `input` is a positive decimal with at most `decimals` places.
pub fn validate_amount(input: &str, decimals: u32) -> bool {
    let places = input
        .trim()
        .split_once('.')
        .map(|(_, f)| f.len())
        .unwrap_or(0);

    places <= decimals as usize && matches!(parse_amount(input, decimals), Ok(v) if v > 0)
}

/// Shortens a key for display: `ABCD...WXYZ`. Counts chars, not bytes.
pub fn format_public_key(key: &str, chars: usize) -> String {
    let count = key.chars().count();
    if count <= chars.saturating_mul(2) {
        return key.to_string();
    }

    let head_end = key.char_indices().nth(chars).map_or(key.len(), |(i, _)| i);
    let tail_start = key
        .char_indices()
        .nth(count - chars)
        .map_or(key.len(), |(i, _)| i);
    format!("{}...{}", &key[..head_end], &key[tail_start..])
}
