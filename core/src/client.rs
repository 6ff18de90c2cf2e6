//! Confidential Client
//!
//! Runs each balance operation end to end:
//!
//! ```text
//!   validate ─▶ build request ─▶ submit ─▶ poll(check) ─▶ OperationReport
//! ```
//!
//! Validation and decryption errors return before anything is submitted.
//! After submission every path ends in a report, whatever the poll outcome.

use std::time::Duration;

use dcash_cipher::{BalanceCipher, SharedSecret};
use dcash_config::{ConfirmationPolicy, DcashConfig};
use dcash_fees::{TransferValidator, ValidationError, format_balance, parse_amount};
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::checks::{Checker, Confirmation, Expectation};
use crate::cluster::ClusterKeyCache;
use crate::error::{CoreError, Result};
use crate::ledger::{ClusterKeyProvider, LedgerReader, ProgramSubmitter, SubmissionId};
use crate::poller::{ConfirmationPoller, PollOutcome};
use crate::request::{ComputationKind, ComputationRequest, Payload};
use crate::wallet::WalletRecord;

/// What happened to one submitted computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    pub kind: ComputationKind,
    pub offset: u64,
    pub submission: SubmissionId,
    pub outcome: PollOutcome<Confirmation>,
}

impl OperationReport {
    /// Turns a `Rejected` outcome into [`CoreError::ComputationRejected`].
    /// Other outcomes pass through.
    pub fn check(self) -> Result<Self> {
        match self.outcome {
            PollOutcome::Rejected { status_code, .. } => Err(CoreError::ComputationRejected {
                offset: self.offset,
                status_code,
            }),
            _ => Ok(self),
        }
    }
}

pub struct ConfidentialClient<L, S, P, C> {
    ledger: L,
    submitter: S,
    cluster: ClusterKeyCache<P>,
    cipher: C,
    poller: ConfirmationPoller,
    /// Applied before polling withdrawals and transfers.
    settle_grace: Duration,
    policy: ConfirmationPolicy,
    optimistic_after: u32,
    validator: TransferValidator,
    decimals: u32,
}

impl<L, S, P, C> ConfidentialClient<L, S, P, C>
where
    L: LedgerReader,
    S: ProgramSubmitter,
    P: ClusterKeyProvider,
    C: BalanceCipher,
{
    /// Client with default settings. `cipher` must match the cluster's.
    pub fn new(ledger: L, submitter: S, cluster_keys: P, cipher: C) -> Self {
        Self::from_config(&DcashConfig::default(), ledger, submitter, cluster_keys, cipher)
    }

    pub fn from_config(
        config: &DcashConfig,
        ledger: L,
        submitter: S,
        cluster_keys: P,
        cipher: C,
    ) -> Self {
        Self {
            ledger,
            submitter,
            cluster: ClusterKeyCache::new(cluster_keys),
            cipher,
            poller: ConfirmationPoller::from_config(&config.polling),
            settle_grace: Duration::from_millis(config.polling.initial_grace_ms),
            policy: config.polling.policy,
            optimistic_after: config.polling.optimistic_after,
            validator: TransferValidator::new(config.transfer.max_transfer),
            decimals: config.transfer.decimals,
        }
    }

    pub fn with_poller(mut self, poller: ConfirmationPoller, settle_grace: Duration) -> Self {
        self.poller = poller;
        self.settle_grace = settle_grace;
        self
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy, optimistic_after: u32) -> Self {
        self.policy = policy;
        self.optimistic_after = optimistic_after;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn cluster_keys(&mut self) -> &mut ClusterKeyCache<P> {
        &mut self.cluster
    }

    pub fn validator(&self) -> &TransferValidator {
        &self.validator
    }

    /// Base units as a display string with `display_decimals` places.
    pub fn format_amount(&self, base: u64, display_decimals: u32) -> String {
        format_balance(u128::from(base), self.decimals, display_decimals)
    }

    /// Parses user input such as `"12.5"` into base units.
    pub fn parse_amount(&self, input: &str) -> Result<u64> {
        Ok(parse_amount(input, self.decimals)?)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    async fn shared_secret(&self, wallet: &WalletRecord) -> Result<SharedSecret> {
        Ok(self.cluster.shared_secret(&wallet.encryption).await?)
    }

    /// Decrypted balance of `wallet` in base units.
    pub async fn balance(&self, wallet: &WalletRecord) -> Result<u64> {
        let secret = self.shared_secret(wallet).await?;
        self.balance_with(wallet, &secret).await
    }

    async fn balance_with(&self, wallet: &WalletRecord, secret: &SharedSecret) -> Result<u64> {
        let owner = wallet.owner();
        let account = self
            .ledger
            .balance_account(&owner)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound {
                owner: owner.to_string(),
            })?;
        Ok(account.decrypt(&self.cipher, secret)?)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Creates the balance account if missing. `None` if it already exists.
    pub async fn ensure_account(&self, wallet: &WalletRecord) -> Result<Option<OperationReport>> {
        let owner = wallet.owner();
        if self.ledger.account_exists(&owner).await? {
            return Ok(None);
        }

        let request = ComputationRequest::build(Payload::AccountInit {
            encryption_public_key: wallet.encryption.public_key,
        });
        let submission = self.submit(wallet, &request).await?;

        let checker = Checker::new(&self.ledger, &self.cipher, owner, request.offset);
        let outcome = self
            .poller
            .poll(&label(&request), |_| checker.account_created())
            .await;

        Ok(Some(report(request, submission, outcome)))
    }

    pub async fn deposit(&self, wallet: &WalletRecord, amount: u64) -> Result<OperationReport> {
        if amount == 0 {
            return Err(ValidationError::ZeroAmount.into());
        }

        let secret = self.shared_secret(wallet).await?;
        let before = self.balance_with(wallet, &secret).await?;

        let request = ComputationRequest::build(Payload::Deposit { amount });
        self.run(
            wallet,
            request,
            &secret,
            Expectation::after_deposit(before, amount),
            Duration::ZERO,
        )
        .await
    }

    pub async fn transfer(
        &self,
        wallet: &WalletRecord,
        recipient: &Pubkey,
        amount: u64,
        variance: u8,
    ) -> Result<OperationReport> {
        let secret = self.shared_secret(wallet).await?;
        let before = self.balance_with(wallet, &secret).await?;
        let plan = self.validator.validate(amount, variance, before)?;

        let request = ComputationRequest::build(Payload::Transfer {
            amount: plan.amount,
            variance: plan.variance,
            recipient: *recipient,
        });
        self.run(
            wallet,
            request,
            &secret,
            Expectation::after_transfer(plan.sender_balance_before),
            self.settle_grace,
        )
        .await
    }

    pub async fn withdraw(&self, wallet: &WalletRecord, amount: u64) -> Result<OperationReport> {
        let secret = self.shared_secret(wallet).await?;
        let before = self.balance_with(wallet, &secret).await?;
        self.validator.validate_withdraw(amount, before)?;

        let request = ComputationRequest::build(Payload::Withdraw { amount });
        self.run(
            wallet,
            request,
            &secret,
            Expectation::after_withdraw(before, amount),
            self.settle_grace,
        )
        .await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn submit(
        &self,
        wallet: &WalletRecord,
        request: &ComputationRequest,
    ) -> Result<SubmissionId> {
        let submission = self.submitter.submit(&wallet.keypair, request).await?;
        info!(
            "Submitted {} (offset {}) for {}: {}",
            request.kind, request.offset, wallet.public_key, submission
        );
        Ok(submission)
    }

    async fn run(
        &self,
        wallet: &WalletRecord,
        request: ComputationRequest,
        secret: &SharedSecret,
        expectation: Expectation,
        grace: Duration,
    ) -> Result<OperationReport> {
        let submission = self.submit(wallet, &request).await?;

        let checker = Checker::new(&self.ledger, &self.cipher, wallet.owner(), request.offset)
            .with_policy(self.policy, self.optimistic_after);
        let outcome = self
            .poller
            .with_grace(grace)
            .poll(&label(&request), |_| checker.balance(secret, expectation))
            .await;

        Ok(report(request, submission, outcome))
    }
}

fn label(request: &ComputationRequest) -> String {
    format!("{} {}", request.kind, request.offset)
}

fn report(
    request: ComputationRequest,
    submission: SubmissionId,
    outcome: PollOutcome<Confirmation>,
) -> OperationReport {
    info!(
        "{} {} finished after {} attempt(s): confirmed={}",
        request.kind,
        request.offset,
        outcome.attempts(),
        outcome.is_confirmed()
    );
    OperationReport {
        kind: request.kind,
        offset: request.offset,
        submission,
        outcome,
    }
}
