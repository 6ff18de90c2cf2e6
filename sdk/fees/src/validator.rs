use serde::{Deserialize, Serialize};

use crate::ValidationError;
use crate::units::DC_DECIMALS;
use crate::variance::max_total_cost;

/// 1000 DC in base units.
pub const DEFAULT_MAX_TRANSFER: u64 = 1_000 * 10u64.pow(DC_DECIMALS);

/// An accepted transfer, ready to be turned into a computation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    pub amount: u64,
    pub variance: u8,
    pub sender_balance_before: u64,
}

impl TransferPlan {
    pub fn max_total_cost(&self) -> u128 {
        max_total_cost(self.amount, self.variance)
    }
}

/// Checks, in order:
/// 1. `amount > 0`
/// 2. `amount <= max_transfer_limit`
/// 3. `max_total_cost(amount, variance) <= available_balance`
///
/// The first failing rule is the one reported.
pub fn validate_transfer(
    amount: u64,
    variance: u8,
    available_balance: u64,
    max_transfer_limit: u64,
) -> Result<TransferPlan, ValidationError> {
    if amount == 0 {
        return Err(ValidationError::ZeroAmount);
    }

    if amount > max_transfer_limit {
        return Err(ValidationError::ExceedsLimit {
            amount,
            limit: max_transfer_limit,
        });
    }

    let required = max_total_cost(amount, variance);
    if required > u128::from(available_balance) {
        return Err(ValidationError::InsufficientBalance {
            required,
            available: available_balance,
        });
    }

    Ok(TransferPlan {
        amount,
        variance,
        sender_balance_before: available_balance,
    })
}

/// Holds the per-transaction limit so callers don't thread it everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferValidator {
    pub max_transfer: u64,
}

impl Default for TransferValidator {
    fn default() -> Self {
        Self {
            max_transfer: DEFAULT_MAX_TRANSFER,
        }
    }
}

impl TransferValidator {
    pub fn new(max_transfer: u64) -> Self {
        Self { max_transfer }
    }

    pub fn validate(
        &self,
        amount: u64,
        variance: u8,
        available_balance: u64,
    ) -> Result<TransferPlan, ValidationError> {
        validate_transfer(amount, variance, available_balance, self.max_transfer)
    }

    /// Withdrawals carry no variance or fee: the amount must be positive and
    /// covered by the balance.
    pub fn validate_withdraw(
        &self,
        amount: u64,
        available_balance: u64,
    ) -> Result<(), ValidationError> {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount);
        }
        if amount > available_balance {
            return Err(ValidationError::InsufficientBalance {
                required: u128::from(amount),
                available: available_balance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit_is_1000_dc() {
        assert_eq!(DEFAULT_MAX_TRANSFER, 1_000_000_000);
        assert_eq!(TransferValidator::default().max_transfer, DEFAULT_MAX_TRANSFER);
    }

    #[test]
    fn test_zero_amount_rejected_first() {
        // zero wins even with an empty balance and a zero limit
        assert_eq!(
            validate_transfer(0, 0, 0, 0),
            Err(ValidationError::ZeroAmount)
        );
    }

    #[test]
    fn test_limit_checked_before_balance() {
        let amount = 1_001 * 1_000_000;
        assert_eq!(
            validate_transfer(amount, 0, 0, DEFAULT_MAX_TRANSFER),
            Err(ValidationError::ExceedsLimit {
                amount,
                limit: DEFAULT_MAX_TRANSFER
            })
        );
    }

    #[test]
    fn test_over_limit_with_huge_balance() {
        let amount = 1_001 * 1_000_000;
        let err = validate_transfer(amount, 0, u64::MAX, DEFAULT_MAX_TRANSFER).unwrap_err();
        assert!(matches!(err, ValidationError::ExceedsLimit { .. }));
    }

    #[test]
    fn test_insufficient_balance() {
        assert_eq!(
            validate_transfer(100, 10, 99, DEFAULT_MAX_TRANSFER),
            Err(ValidationError::InsufficientBalance {
                required: 199,
                available: 99
            })
        );
    }

    #[test]
    fn test_exact_balance_accepted() {
        let plan = validate_transfer(100_000_000, 10, 199_999_999, DEFAULT_MAX_TRANSFER).unwrap();
        assert_eq!(plan.max_total_cost(), 199_999_999);
        assert_eq!(plan.sender_balance_before, 199_999_999);

        assert!(validate_transfer(100_000_000, 10, 199_999_998, DEFAULT_MAX_TRANSFER).is_err());
    }

    #[test]
    fn test_limit_is_inclusive() {
        let v = TransferValidator::default();
        assert!(v.validate(DEFAULT_MAX_TRANSFER, 255, u64::MAX).is_ok());
    }

    #[test]
    fn test_withdraw_rules() {
        let v = TransferValidator::default();
        assert_eq!(v.validate_withdraw(0, 10), Err(ValidationError::ZeroAmount));
        assert!(v.validate_withdraw(10, 10).is_ok());
        assert_eq!(
            v.validate_withdraw(11, 10),
            Err(ValidationError::InsufficientBalance {
                required: 11,
                available: 10
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::ZeroAmount.to_string(),
            "amount must be greater than 0"
        );
        assert_eq!(
            ValidationError::ExceedsLimit {
                amount: 5,
                limit: 4
            }
            .to_string(),
            "amount 5 exceeds the per-transaction limit of 4"
        );
    }
}
