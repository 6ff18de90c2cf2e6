//! Transfer Costs
//!
//! A transfer's sender picks a variance in `0..=255`. Higher variance
//! obfuscates the moved amount more and earns a lower fee.
//!
//! ```text
//!   variance      0 ────────────────────────────▶ 255
//!   fee (bps)   255 ────────────────────────────▶ 0
//!   max var.      0 ────────────────────────────▶ amount
//!
//!   worst case cost = amount + max_variance_cost + max_fee_cost
//! ```
//!
//! All of this is pure arithmetic: nothing here touches the network, and
//! validation must run before a transfer request is built.

pub mod units;
pub mod validator;
pub mod variance;

pub use units::{
    DC_DECIMALS, format_balance, format_public_key, parse_amount, to_base_units, validate_amount,
};
pub use validator::{DEFAULT_MAX_TRANSFER, TransferPlan, TransferValidator, validate_transfer};
pub use variance::{
    MAX_VARIANCE, fee_basis_points, fee_percentage, max_fee_cost, max_total_cost,
    max_variance_cost,
};

use thiserror::Error;

/// Why a proposed transfer or withdrawal was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be greater than 0")]
    ZeroAmount,

    #[error("amount {amount} exceeds the per-transaction limit of {limit}")]
    ExceedsLimit { amount: u64, limit: u64 },

    #[error("insufficient balance: need up to {required}, have {available}")]
    InsufficientBalance { required: u128, available: u64 },
}

/// Errors parsing a human-entered amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount: {0}")]
    Invalid(String),

    #[error("amount does not fit in base units")]
    Overflow,
}
