//! Computation requests
//!
//! A request is one unit of confidential work queued for the MPC cluster.
//! The offset is its correlation id; it is drawn at random and never reused,
//! so a failed request is retried by building a new one.

use dcash_cipher::{NONCE_LENGTH, Nonce};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::Result;
use crate::instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationKind {
    AccountInit,
    Deposit,
    Transfer,
    Withdraw,
}

impl ComputationKind {
    /// Name of the circuit's computation definition.
    pub fn comp_def_name(self) -> &'static str {
        match self {
            Self::AccountInit => "init_user_dc_balance",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::Withdraw => "withdraw",
        }
    }

    /// Program method that queues the computation.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::AccountInit => "queue_create_dc_token_account",
            Self::Deposit => "queue_deposit",
            Self::Transfer => "queue_transfer",
            Self::Withdraw => "queue_withdraw",
        }
    }

    /// Only account creation encrypts under a client nonce. The other
    /// computations re-encrypt under a nonce chosen by the cluster.
    pub fn needs_client_nonce(self) -> bool {
        matches!(self, Self::AccountInit)
    }
}

impl std::fmt::Display for ComputationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.comp_def_name())
    }
}

/// Operation-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    AccountInit { encryption_public_key: [u8; 32] },
    Deposit { amount: u64 },
    Transfer { amount: u64, variance: u8, recipient: Pubkey },
    Withdraw { amount: u64 },
}

impl Payload {
    pub fn kind(&self) -> ComputationKind {
        match self {
            Self::AccountInit { .. } => ComputationKind::AccountInit,
            Self::Deposit { .. } => ComputationKind::Deposit,
            Self::Transfer { .. } => ComputationKind::Transfer,
            Self::Withdraw { .. } => ComputationKind::Withdraw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationRequest {
    pub kind: ComputationKind,
    pub offset: u64,
    pub nonce: Option<Nonce>,
    pub payload: Payload,
}

impl ComputationRequest {
    /// Builds a request with a fresh offset (and nonce, when the kind needs
    /// one) from the OS RNG.
    pub fn build(payload: Payload) -> Self {
        Self::build_with_rng(payload, &mut OsRng)
    }

    pub fn build_with_rng<R: RngCore + CryptoRng>(payload: Payload, rng: &mut R) -> Self {
        let kind = payload.kind();
        let offset = rng.next_u64();

        let nonce = kind.needs_client_nonce().then(|| {
            let mut nonce = [0u8; NONCE_LENGTH];
            rng.fill_bytes(&mut nonce);
            nonce
        });

        Self {
            kind,
            offset,
            nonce,
            payload,
        }
    }

    /// Program instruction data for this request.
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        instruction::encode(self)
    }

    /// Computation definition offset this request runs under.
    pub fn comp_def_offset(&self) -> u32 {
        instruction::comp_def_offset(self.kind.comp_def_name())
    }
}
