//! Completion checks handed to the [`ConfirmationPoller`](crate::ConfirmationPoller).
//!
//! Under the verified policy a computation counts as done only once the
//! ledger shows its effect:
//!
//! | operation    | complete when                         |
//! |--------------|---------------------------------------|
//! | account init | balance account exists                |
//! | deposit      | decrypted balance >= before + amount  |
//! | withdraw     | decrypted balance <= before - amount  |
//! | transfer     | decrypted balance != before           |
//!
//! A nonzero computation status short-circuits to `Rejected`. The optimistic
//! policy stops waiting once more than `optimistic_after` attempts have read
//! and decrypted the account, and reports the result as
//! [`Confirmation::Assumed`]. Missing accounts and failed reads do not count.

use std::sync::atomic::{AtomicU32, Ordering};

use dcash_cipher::{BalanceCipher, CipherError, SharedSecret};
use dcash_config::ConfirmationPolicy;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::ledger::{LedgerReader, TransportError};
use crate::poller::CheckStatus;

/// Evidence carried by a confirmed poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    AccountCreated,
    /// The decrypted balance that satisfied the check.
    Balance(u64),
    /// Not observed on the ledger; assumed after enough quiet attempts.
    Assumed,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Expected movement of the owner's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    AtLeast(u64),
    AtMost(u64),
    Differs(u64),
}

impl Expectation {
    pub fn after_deposit(before: u64, amount: u64) -> Self {
        Self::AtLeast(before.saturating_add(amount))
    }

    pub fn after_withdraw(before: u64, amount: u64) -> Self {
        Self::AtMost(before.saturating_sub(amount))
    }

    pub fn after_transfer(before: u64) -> Self {
        Self::Differs(before)
    }

    pub fn is_met(self, balance: u64) -> bool {
        match self {
            Self::AtLeast(min) => balance >= min,
            Self::AtMost(max) => balance <= max,
            Self::Differs(before) => balance != before,
        }
    }
}

pub struct Checker<'a, L, C> {
    ledger: &'a L,
    cipher: &'a C,
    owner: Pubkey,
    offset: u64,
    policy: ConfirmationPolicy,
    optimistic_after: u32,
    /// Attempts that read and decrypted the account.
    readable: AtomicU32,
}

impl<'a, L: LedgerReader, C: BalanceCipher> Checker<'a, L, C> {
    pub fn new(ledger: &'a L, cipher: &'a C, owner: Pubkey, offset: u64) -> Self {
        Self {
            ledger,
            cipher,
            owner,
            offset,
            policy: ConfirmationPolicy::Verified,
            optimistic_after: 0,
            readable: AtomicU32::new(0),
        }
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy, optimistic_after: u32) -> Self {
        self.policy = policy;
        self.optimistic_after = optimistic_after;
        self
    }

    async fn rejected(&self) -> Result<Option<u8>, TransportError> {
        Ok(self
            .ledger
            .computation_status(self.offset)
            .await?
            .filter(|code| *code != 0))
    }

    /// Account creation is always verified: existence is cheap to observe.
    pub async fn account_created(&self) -> Result<CheckStatus<Confirmation>, CheckError> {
        if let Some(status_code) = self.rejected().await? {
            return Ok(CheckStatus::Rejected { status_code });
        }
        if self.ledger.account_exists(&self.owner).await? {
            Ok(CheckStatus::Complete(Confirmation::AccountCreated))
        } else {
            Ok(CheckStatus::Pending)
        }
    }

    pub async fn balance(
        &self,
        secret: &SharedSecret,
        expectation: Expectation,
    ) -> Result<CheckStatus<Confirmation>, CheckError> {
        if let Some(status_code) = self.rejected().await? {
            return Ok(CheckStatus::Rejected { status_code });
        }

        let Some(account) = self.ledger.balance_account(&self.owner).await? else {
            return Ok(CheckStatus::Pending);
        };
        let balance = account.decrypt(self.cipher, secret)?;
        if expectation.is_met(balance) {
            return Ok(CheckStatus::Complete(Confirmation::Balance(balance)));
        }

        let readable = self.readable.fetch_add(1, Ordering::Relaxed) + 1;
        if self.policy == ConfirmationPolicy::Optimistic && readable > self.optimistic_after {
            return Ok(CheckStatus::Complete(Confirmation::Assumed));
        }
        Ok(CheckStatus::Pending)
    }
}
