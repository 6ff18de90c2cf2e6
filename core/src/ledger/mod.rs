//! Ledger collaborators
//!
//! The core never talks to the chain directly. It reads balance accounts
//! through a [`LedgerReader`], queues computations through a
//! [`ProgramSubmitter`], and learns the MPC cluster key from a
//! [`ClusterKeyProvider`].

pub mod account;
pub mod mxe;
pub mod pda;
pub mod rpc;

use std::future::Future;

use dcash_keys::SigningKeypair;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::request::ComputationRequest;

pub use account::{EncryptedBalance, USER_ACCOUNT_LENGTH, USER_ACCOUNT_NAME};
pub use mxe::{MXE_ACCOUNT_NAME, decode_cluster_key};
pub use pda::{MXE_ACCOUNT_SEED, USER_ACCOUNT_SEED, mxe_account_address, user_account_address};
pub use rpc::{RpcClusterKeyProvider, RpcLedgerReader, mxe_account_for};

/// Network or RPC failure. Retried inside the poller, surfaced elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("rpc request failed: {0}")]
    Rpc(String),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("malformed account data: {0}")]
    InvalidAccountData(String),

    #[error("cluster key unavailable: {0}")]
    ClusterKey(String),
}

/// Transaction signature or other id returned by a submitter.
pub type SubmissionId = String;

// ============================================================================
// Traits
// ============================================================================

/// Read access to confidential balance accounts.
pub trait LedgerReader: Send + Sync {
    /// The owner's balance account, `None` if it does not exist yet.
    fn balance_account(
        &self,
        owner: &Pubkey,
    ) -> impl Future<Output = Result<Option<EncryptedBalance>, TransportError>> + Send;

    fn account_exists(
        &self,
        owner: &Pubkey,
    ) -> impl Future<Output = Result<bool, TransportError>> + Send {
        async move { Ok(self.balance_account(owner).await?.is_some()) }
    }

    /// Status code the program reported for a finished computation, if the
    /// reader can observe completion events. `Some(0)` is success.
    fn computation_status(
        &self,
        _offset: u64,
    ) -> impl Future<Output = Result<Option<u8>, TransportError>> + Send {
        async { Ok(None) }
    }
}

/// Signs and sends a computation request to the ledger program.
pub trait ProgramSubmitter: Send + Sync {
    fn submit(
        &self,
        signer: &SigningKeypair,
        request: &ComputationRequest,
    ) -> impl Future<Output = Result<SubmissionId, TransportError>> + Send;
}

/// Source of the MPC cluster's x25519 public key.
pub trait ClusterKeyProvider: Send + Sync {
    fn fetch_cluster_key(&self) -> impl Future<Output = Result<[u8; 32], TransportError>> + Send;
}

// ============================================================================
// Static Provider
// ============================================================================

/// Cluster key pinned in configuration, for deployments that skip the MXE
/// account lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticClusterKeyProvider {
    key: [u8; 32],
}

impl StaticClusterKeyProvider {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// `Ok(None)` when the config pins no key.
    pub fn from_config(
        config: &dcash_config::DcashConfig,
    ) -> Result<Option<Self>, TransportError> {
        config
            .mxe_public_key()
            .map(|key| key.map(Self::new))
            .map_err(|e| TransportError::ClusterKey(e.to_string()))
    }
}

impl ClusterKeyProvider for StaticClusterKeyProvider {
    async fn fetch_cluster_key(&self) -> Result<[u8; 32], TransportError> {
        Ok(self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcash_config::DcashConfig;

    #[tokio::test]
    async fn test_static_provider_from_config() {
        let mut config = DcashConfig::default();
        assert!(StaticClusterKeyProvider::from_config(&config).unwrap().is_none());

        config.solana.mxe_public_key = Some(hex::encode([4u8; 32]));
        let provider = StaticClusterKeyProvider::from_config(&config)
            .unwrap()
            .unwrap();
        assert_eq!(provider.fetch_cluster_key().await.unwrap(), [4u8; 32]);

        config.solana.mxe_public_key = Some("abcd".into());
        assert!(matches!(
            StaticClusterKeyProvider::from_config(&config),
            Err(TransportError::ClusterKey(_))
        ));
    }
}
