/// Highest variance a sender can choose.
pub const MAX_VARIANCE: u8 = u8::MAX;

/// Fee in basis points: `255 - variance`.
pub fn fee_basis_points(variance: u8) -> u16 {
    u16::from(MAX_VARIANCE - variance)
}

/// Fee as a percentage with two decimals, for display only.
///
/// `fee_percentage(0) == "2.55"`, `fee_percentage(255) == "0.00"`.
pub fn fee_percentage(variance: u8) -> String {
    format!("{:.2}", f64::from(fee_basis_points(variance)) / 100.0)
}

/// `floor(amount * variance / 255)`
pub fn max_variance_cost(amount: u64, variance: u8) -> u64 {
    scale(amount, u128::from(variance))
}

/// `floor(amount * fee_bps / 255)`
pub fn max_fee_cost(amount: u64, variance: u8) -> u64 {
    scale(amount, u128::from(fee_basis_points(variance)))
}

/// Worst-case debit to the sender. Can exceed `u64::MAX` for huge amounts,
/// hence the wider type.
pub fn max_total_cost(amount: u64, variance: u8) -> u128 {
    u128::from(amount)
        + u128::from(max_variance_cost(amount, variance))
        + u128::from(max_fee_cost(amount, variance))
}

// numerator <= 255, so the quotient never exceeds `amount`
fn scale(amount: u64, numerator: u128) -> u64 {
    (u128::from(amount) * numerator / u128::from(MAX_VARIANCE)) as u64
}
