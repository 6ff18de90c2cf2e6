//! Session cache for the MPC cluster key.

use dcash_cipher::SharedSecret;
use dcash_keys::EncryptionKeyPair;
use tokio::sync::OnceCell;
use tracing::info;

use crate::ledger::{ClusterKeyProvider, TransportError};

/// Fetches the cluster key once and serves it for the rest of the session.
/// Concurrent first callers share a single fetch.
pub struct ClusterKeyCache<P> {
    provider: P,
    key: OnceCell<[u8; 32]>,
}

impl<P: ClusterKeyProvider> ClusterKeyCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            key: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<[u8; 32], TransportError> {
        self.key
            .get_or_try_init(|| async {
                let key = self.provider.fetch_cluster_key().await?;
                info!("Cluster key cached: {}", hex::encode(key));
                Ok::<_, TransportError>(key)
            })
            .await
            .copied()
    }

    pub fn cached(&self) -> Option<[u8; 32]> {
        self.key.get().copied()
    }

    /// Drops the cached key; the next `get` fetches again.
    pub fn reset(&mut self) {
        self.key = OnceCell::new();
    }

    /// Shared secret between `keys` and the cluster.
    pub async fn shared_secret(
        &self,
        keys: &EncryptionKeyPair,
    ) -> Result<SharedSecret, TransportError> {
        let cluster = self.get().await?;
        Ok(SharedSecret::agree(&keys.private_key, &cluster))
    }
}
