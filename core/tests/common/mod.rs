//! In-memory collaborators standing in for the ledger and the MPC cluster.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use dcash_cipher::{BalanceCipher, KeystreamCipher, SharedSecret, nonce_from_u128};
use dcash_core::ledger::{
    EncryptedBalance, LedgerReader, ProgramSubmitter, StaticClusterKeyProvider, SubmissionId,
    TransportError,
};
use dcash_core::{ComputationRequest, ConfidentialClient, Payload, WalletRecord};
use dcash_fees::max_fee_cost;
use dcash_keys::{EncryptionKeyPair, SigningKeypair};
use solana_sdk::pubkey::Pubkey;

pub const CLUSTER_PRIVATE: [u8; 32] = [11u8; 32];

pub fn cluster_public() -> [u8; 32] {
    EncryptionKeyPair::from_private(CLUSTER_PRIVATE).public_key
}

/// Plaintext view of an account, encrypted on every read.
#[derive(Debug, Clone, Copy)]
struct Account {
    x25519_public: [u8; 32],
    balance: u64,
    nonce: u128,
}

struct Scheduled {
    reads_left: u32,
    apply: Box<dyn FnOnce(&mut HashMap<Pubkey, Account>) + Send>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<Pubkey, Account>,
    statuses: HashMap<u64, u8>,
    scheduled: Vec<Scheduled>,
    failing_reads: u32,
    fail_after: Option<u32>,
    reads: u32,
}

#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<State>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_account(&self, wallet: &WalletRecord, balance: u64) {
        self.state.lock().unwrap().accounts.insert(
            wallet.owner(),
            Account {
                x25519_public: wallet.encryption.public_key,
                balance,
                nonce: 1,
            },
        );
    }

    pub fn plaintext_balance(&self, owner: &Pubkey) -> Option<u64> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(owner)
            .map(|a| a.balance)
    }

    /// Removes the account once `reads` more reads have happened.
    pub fn close_account_after(&self, owner: Pubkey, reads: u32) {
        self.schedule(reads, move |accounts| {
            accounts.remove(&owner);
        });
    }

    /// The next `n` reads fail with a transport error.
    pub fn fail_next_reads(&self, n: u32) {
        self.state.lock().unwrap().failing_reads = n;
    }

    /// Every read after the first `n` (counted from creation) fails.
    pub fn fail_reads_after(&self, n: u32) {
        self.state.lock().unwrap().fail_after = Some(n);
    }

    pub fn reads(&self) -> u32 {
        self.state.lock().unwrap().reads
    }

    pub fn set_status(&self, offset: u64, code: u8) {
        self.state.lock().unwrap().statuses.insert(offset, code);
    }

    fn schedule(
        &self,
        reads_left: u32,
        apply: impl FnOnce(&mut HashMap<Pubkey, Account>) + Send + 'static,
    ) {
        self.state.lock().unwrap().scheduled.push(Scheduled {
            reads_left,
            apply: Box::new(apply),
        });
    }

    fn read(&self, owner: &Pubkey) -> Result<Option<EncryptedBalance>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;

        let mut due = Vec::new();
        for s in std::mem::take(&mut state.scheduled) {
            if s.reads_left <= 1 {
                due.push(s.apply);
            } else {
                state.scheduled.push(Scheduled {
                    reads_left: s.reads_left - 1,
                    apply: s.apply,
                });
            }
        }
        for apply in due {
            apply(&mut state.accounts);
        }

        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(TransportError::Rpc("connection reset".into()));
        }
        if state.fail_after.is_some_and(|n| state.reads > n) {
            return Err(TransportError::Rpc("node is behind".into()));
        }

        Ok(state.accounts.get(owner).map(|a| {
            let secret = SharedSecret::agree(&CLUSTER_PRIVATE, &a.x25519_public);
            EncryptedBalance {
                owner: *owner,
                ciphertext: KeystreamCipher.encrypt(&secret, a.balance, &nonce_from_u128(a.nonce)),
                nonce: a.nonce,
            }
        }))
    }
}

impl LedgerReader for MemoryLedger {
    async fn balance_account(
        &self,
        owner: &Pubkey,
    ) -> Result<Option<EncryptedBalance>, TransportError> {
        self.read(owner)
    }

    async fn computation_status(&self, offset: u64) -> Result<Option<u8>, TransportError> {
        Ok(self.state.lock().unwrap().statuses.get(&offset).copied())
    }
}

/// Records requests and plays the cluster: each accepted request changes
/// the ledger after `delay_reads` further reads.
#[derive(Clone)]
pub struct RecordingSubmitter {
    ledger: MemoryLedger,
    submitted: Arc<Mutex<Vec<ComputationRequest>>>,
    pub delay_reads: u32,
    pub reject_with: Option<u8>,
    pub apply_effects: bool,
    pub fail: bool,
}

impl RecordingSubmitter {
    pub fn new(ledger: MemoryLedger) -> Self {
        Self {
            ledger,
            submitted: Arc::default(),
            delay_reads: 2,
            reject_with: None,
            apply_effects: true,
            fail: false,
        }
    }

    pub fn submitted(&self) -> Vec<ComputationRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

fn bump(account: &mut Account, balance: u64) {
    account.balance = balance;
    account.nonce += 1;
}

impl ProgramSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        signer: &SigningKeypair,
        request: &ComputationRequest,
    ) -> Result<SubmissionId, TransportError> {
        if self.fail {
            return Err(TransportError::Submission("blockhash not found".into()));
        }
        self.submitted.lock().unwrap().push(request.clone());

        if let Some(code) = self.reject_with {
            self.ledger.set_status(request.offset, code);
            return Ok(format!("sig-{}", request.offset));
        }
        if !self.apply_effects {
            return Ok(format!("sig-{}", request.offset));
        }

        let owner = Pubkey::new_from_array(signer.pubkey_bytes());
        match request.payload.clone() {
            Payload::AccountInit {
                encryption_public_key,
            } => self.ledger.schedule(self.delay_reads, move |accounts| {
                accounts.insert(
                    owner,
                    Account {
                        x25519_public: encryption_public_key,
                        balance: 0,
                        nonce: 0,
                    },
                );
            }),
            Payload::Deposit { amount } => self.ledger.schedule(self.delay_reads, move |accounts| {
                if let Some(a) = accounts.get_mut(&owner) {
                    let balance = a.balance + amount;
                    bump(a, balance);
                }
            }),
            Payload::Withdraw { amount } => self.ledger.schedule(self.delay_reads, move |accounts| {
                if let Some(a) = accounts.get_mut(&owner) {
                    let balance = a.balance - amount;
                    bump(a, balance);
                }
            }),
            Payload::Transfer {
                amount,
                variance,
                recipient,
            } => self.ledger.schedule(self.delay_reads, move |accounts| {
                if let Some(a) = accounts.get_mut(&owner) {
                    let balance = a.balance - amount - max_fee_cost(amount, variance);
                    bump(a, balance);
                }
                if let Some(r) = accounts.get_mut(&recipient) {
                    let balance = r.balance + amount;
                    bump(r, balance);
                }
            }),
        }

        Ok(format!("sig-{}", request.offset))
    }
}

pub type TestClient =
    ConfidentialClient<MemoryLedger, RecordingSubmitter, StaticClusterKeyProvider, KeystreamCipher>;

pub fn client(ledger: &MemoryLedger, submitter: &RecordingSubmitter) -> TestClient {
    ConfidentialClient::new(
        ledger.clone(),
        submitter.clone(),
        StaticClusterKeyProvider::new(cluster_public()),
        KeystreamCipher,
    )
}
