//! Wallet registry
//!
//! Wallets are keyed by their base58 public key. The active wallet is a
//! single pointer replaced in one step, so a switch can never leave two
//! wallets active. The pointer may be empty (fresh store, or its target was
//! removed behind our back); callers then pick a wallet themselves.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dcash_fees::format_public_key;
use dcash_keys::{EncryptionKeyPair, KeyError, SigningKeypair};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet {0} not found")]
    NotFound(String),

    #[error("wallet {0} already exists")]
    AlreadyExists(String),

    #[error("cannot delete the active wallet {0}")]
    ActiveWallet(String),

    #[error("invalid secret key: {0}")]
    InvalidKey(#[from] KeyError),
}

#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub name: String,
    /// Base58 public key; also the record id.
    pub public_key: String,
    pub keypair: SigningKeypair,
    pub encryption: EncryptionKeyPair,
    pub created_at: DateTime<Utc>,
    /// Insertion order within the store.
    pub sequence: u64,
}

impl WalletRecord {
    fn new(keypair: SigningKeypair, name: Option<&str>, sequence: u64) -> Self {
        let public_key = keypair.pubkey_bs58();
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => format_public_key(&public_key, 4),
        };
        let encryption = EncryptionKeyPair::derive(&keypair);

        Self {
            name,
            public_key,
            keypair,
            encryption,
            created_at: Utc::now(),
            sequence,
        }
    }

    pub fn owner(&self) -> Pubkey {
        Pubkey::new_from_array(self.keypair.pubkey_bytes())
    }

    pub fn summary(&self, active: bool) -> WalletSummary {
        WalletSummary {
            name: self.name.clone(),
            public_key: self.public_key.clone(),
            encryption_public_key: hex::encode(self.encryption.public_key),
            created_at: self.created_at,
            active,
        }
    }
}

/// Secret-free view of a wallet for display or export to a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSummary {
    pub name: String,
    pub public_key: String,
    pub encryption_public_key: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

// ============================================================================
// Store
// ============================================================================

/// Persistence for wallet records and the active pointer.
pub trait WalletStore: Send + Sync {
    fn insert(&self, record: WalletRecord) -> Result<(), WalletError>;
    fn get(&self, public_key: &str) -> Option<WalletRecord>;
    fn remove(&self, public_key: &str) -> Option<WalletRecord>;
    fn all(&self) -> Vec<WalletRecord>;
    fn active_id(&self) -> Option<String>;
    /// Replaces the active pointer in one step.
    fn set_active(&self, public_key: Option<String>);
}

#[derive(Default)]
pub struct MemoryWalletStore {
    wallets: DashMap<String, WalletRecord>,
    active: RwLock<Option<String>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn insert(&self, record: WalletRecord) -> Result<(), WalletError> {
        match self.wallets.entry(record.public_key.clone()) {
            Entry::Occupied(e) => Err(WalletError::AlreadyExists(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(record);
                Ok(())
            }
        }
    }

    fn get(&self, public_key: &str) -> Option<WalletRecord> {
        self.wallets.get(public_key).map(|r| r.value().clone())
    }

    fn remove(&self, public_key: &str) -> Option<WalletRecord> {
        self.wallets.remove(public_key).map(|(_, r)| r)
    }

    fn all(&self) -> Vec<WalletRecord> {
        self.wallets.iter().map(|r| r.value().clone()).collect()
    }

    fn active_id(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_active(&self, public_key: Option<String>) {
        *self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = public_key;
    }
}

// ============================================================================
// Registry
// ============================================================================

pub struct WalletRegistry<S> {
    store: S,
    sequence: AtomicU64,
}

impl<S: WalletStore> WalletRegistry<S> {
    pub fn new(store: S) -> Self {
        let next = store
            .all()
            .iter()
            .map(|w| w.sequence + 1)
            .max()
            .unwrap_or(0);
        Self {
            store,
            sequence: AtomicU64::new(next),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates a wallet and makes it active.
    pub fn create(&self, name: Option<&str>) -> Result<WalletRecord, WalletError> {
        self.add(SigningKeypair::generate(), name)
    }

    /// Imports a 64-byte secret key and makes it active.
    pub fn import_bytes(&self, bytes: &[u8], name: Option<&str>) -> Result<WalletRecord, WalletError> {
        self.add(SigningKeypair::from_bytes(bytes)?, name)
    }

    /// Imports the JSON array export format and makes it active.
    pub fn import_json(&self, json: &str, name: Option<&str>) -> Result<WalletRecord, WalletError> {
        self.add(SigningKeypair::from_json_array(json)?, name)
    }

    fn add(&self, keypair: SigningKeypair, name: Option<&str>) -> Result<WalletRecord, WalletError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let record = WalletRecord::new(keypair, name, sequence);

        self.store.insert(record.clone())?;
        self.store.set_active(Some(record.public_key.clone()));

        info!("Wallet {} ({}) added and activated", record.name, record.public_key);
        Ok(record)
    }

    pub fn get(&self, public_key: &str) -> Option<WalletRecord> {
        self.store.get(public_key)
    }

    /// All wallets, newest first.
    pub fn list(&self) -> Vec<WalletRecord> {
        let mut wallets = self.store.all();
        wallets.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        wallets
    }

    pub fn summaries(&self) -> Vec<WalletSummary> {
        let active = self.store.active_id();
        self.list()
            .iter()
            .map(|w| w.summary(active.as_deref() == Some(w.public_key.as_str())))
            .collect()
    }

    /// The active wallet. `None` if nothing is selected; never picks one.
    pub fn active(&self) -> Option<WalletRecord> {
        self.store.active_id().and_then(|id| self.store.get(&id))
    }

    pub fn switch(&self, public_key: &str) -> Result<WalletRecord, WalletError> {
        let record = self
            .store
            .get(public_key)
            .ok_or_else(|| WalletError::NotFound(public_key.to_string()))?;

        self.store.set_active(Some(record.public_key.clone()));
        info!("Switched active wallet to {}", record.public_key);
        Ok(record)
    }

    /// Removes an inactive wallet.
    pub fn delete(&self, public_key: &str) -> Result<WalletRecord, WalletError> {
        if self.store.active_id().as_deref() == Some(public_key) {
            return Err(WalletError::ActiveWallet(public_key.to_string()));
        }
        self.store
            .remove(public_key)
            .ok_or_else(|| WalletError::NotFound(public_key.to_string()))
    }

    /// Secret key as a JSON byte array, for backup.
    pub fn export(&self, public_key: &str) -> Result<String, WalletError> {
        self.store
            .get(public_key)
            .map(|w| w.keypair.to_json_array())
            .ok_or_else(|| WalletError::NotFound(public_key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WalletRegistry<MemoryWalletStore> {
        WalletRegistry::new(MemoryWalletStore::new())
    }

    #[test]
    fn test_default_name_is_short_pubkey() {
        let reg = registry();
        let w = reg.create(None).unwrap();
        assert_eq!(w.name, format_public_key(&w.public_key, 4));

        let named = reg.create(Some("  savings ")).unwrap();
        assert_eq!(named.name, "savings");
    }

    #[test]
    fn test_create_activates() {
        let reg = registry();
        assert!(reg.active().is_none());

        let a = reg.create(None).unwrap();
        assert_eq!(reg.active().unwrap().public_key, a.public_key);

        let b = reg.create(None).unwrap();
        assert_eq!(reg.active().unwrap().public_key, b.public_key);
    }

    #[test]
    fn test_duplicate_import_rejected() {
        let reg = registry();
        let a = reg.create(None).unwrap();
        let bytes = a.keypair.to_bytes();
        assert_eq!(
            reg.import_bytes(&bytes, None).unwrap_err(),
            WalletError::AlreadyExists(a.public_key)
        );
    }

    #[test]
    fn test_bad_import() {
        let reg = registry();
        assert!(matches!(
            reg.import_bytes(&[1u8; 10], None),
            Err(WalletError::InvalidKey(_))
        ));
        assert!(matches!(
            reg.import_json("not json", None),
            Err(WalletError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_dangling_pointer_reads_as_none() {
        let store = MemoryWalletStore::new();
        store.set_active(Some("gone".into()));
        let reg = WalletRegistry::new(store);
        assert!(reg.active().is_none());
    }

    #[test]
    fn test_summary_hides_secrets() {
        let reg = registry();
        let w = reg.create(Some("main")).unwrap();
        let summaries = reg.summaries();
        assert!(summaries[0].active);
        assert_eq!(summaries[0].encryption_public_key, hex::encode(w.encryption.public_key));

        let printed = format!("{:?} {:?}", summaries[0], w);
        assert!(!printed.contains(&hex::encode(w.encryption.private_key)));
    }
}
