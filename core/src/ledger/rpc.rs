//! Solana RPC collaborators: balance accounts and the cluster key.

use std::str::FromStr;
use std::sync::Arc;

use dcash_config::DcashConfig;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use super::mxe::{MPC_NETWORK_PROGRAM_ID, decode_cluster_key};
use super::{
    ClusterKeyProvider, EncryptedBalance, LedgerReader, TransportError, mxe_account_address,
    user_account_address,
};

/// Reads balance accounts over JSON-RPC at `confirmed` commitment.
pub struct RpcLedgerReader {
    rpc: Arc<RpcClient>,
    program_id: Pubkey,
    commitment: CommitmentConfig,
}

impl RpcLedgerReader {
    pub fn new(rpc_url: impl Into<String>, program_id: Pubkey) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(rpc_url.into(), commitment)),
            program_id,
            commitment,
        }
    }

    pub fn from_config(config: &DcashConfig) -> Result<Self, TransportError> {
        let program_id = Pubkey::from_str(&config.solana.program_id)
            .map_err(|e| TransportError::Rpc(format!("invalid program id: {e}")))?;
        Ok(Self::new(config.solana.rpc_url.clone(), program_id))
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }
}

impl LedgerReader for RpcLedgerReader {
    async fn balance_account(
        &self,
        owner: &Pubkey,
    ) -> Result<Option<EncryptedBalance>, TransportError> {
        let (address, _) = user_account_address(&self.program_id, owner);

        let response = self
            .rpc
            .get_account_with_commitment(&address, self.commitment)
            .await
            .map_err(|e| TransportError::Rpc(e.to_string()))?;

        match response.value {
            Some(account) => {
                debug!("Balance account {} found ({} bytes)", address, account.data.len());
                EncryptedBalance::decode(&account.data).map(Some)
            }
            None => {
                debug!("Balance account {} not found", address);
                Ok(None)
            }
        }
    }
}

// ============================================================================
// Cluster Key
// ============================================================================

/// Reads the cluster key from the program's MXE account.
pub struct RpcClusterKeyProvider {
    rpc: Arc<RpcClient>,
    mxe_account: Pubkey,
    commitment: CommitmentConfig,
}

impl RpcClusterKeyProvider {
    pub fn new(rpc_url: impl Into<String>, mxe_account: Pubkey) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(rpc_url.into(), commitment)),
            mxe_account,
            commitment,
        }
    }

    pub fn from_config(config: &DcashConfig) -> Result<Self, TransportError> {
        Ok(Self::new(config.solana.rpc_url.clone(), mxe_account_for(config)?))
    }

    pub fn mxe_account(&self) -> &Pubkey {
        &self.mxe_account
    }
}

/// The configured MXE account, or the one derived from `program_id`.
pub fn mxe_account_for(config: &DcashConfig) -> Result<Pubkey, TransportError> {
    let configured = config
        .mxe_account()
        .map_err(|e| TransportError::ClusterKey(e.to_string()))?;
    if let Some(account) = configured {
        return Ok(account);
    }

    let program_id = config
        .program_id()
        .map_err(|e| TransportError::ClusterKey(e.to_string()))?;
    let network = Pubkey::from_str(MPC_NETWORK_PROGRAM_ID)
        .map_err(|e| TransportError::ClusterKey(format!("invalid network program id: {e}")))?;
    Ok(mxe_account_address(&network, &program_id).0)
}

impl ClusterKeyProvider for RpcClusterKeyProvider {
    async fn fetch_cluster_key(&self) -> Result<[u8; 32], TransportError> {
        let response = self
            .rpc
            .get_account_with_commitment(&self.mxe_account, self.commitment)
            .await
            .map_err(|e| TransportError::Rpc(e.to_string()))?;

        let account = response.value.ok_or_else(|| {
            TransportError::ClusterKey(format!("MXE account {} not found", self.mxe_account))
        })?;
        let key = decode_cluster_key(&account.data)?;
        info!("Cluster key read from MXE account {}", self.mxe_account);
        Ok(key)
    }
}
