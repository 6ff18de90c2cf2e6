//! DCash Core
//!
//! Orchestrates confidential balance operations against a ledger program
//! whose state is mutated by an external MPC cluster.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        ConfidentialClient                             │
//! │                                                                       │
//! │  validate ──▶ ComputationRequest::build ──▶ ProgramSubmitter::submit  │
//! │                                                   │                   │
//! │                                                   ▼                   │
//! │                         ConfirmationPoller::poll(check)               │
//! │                                   │                                   │
//! │             ┌─────────────────────┼──────────────────────┐            │
//! │             ▼                     ▼                      ▼            │
//! │        LedgerReader        ClusterKeyCache         SharedSecret       │
//! │     (balance account)    (MPC x25519 key)      (decrypt balance)      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger, the submitter and the cluster key source are collaborators
//! behind traits in [`ledger`]; [`ledger::rpc`] has the Solana RPC reader.

pub mod checks;
pub mod client;
pub mod cluster;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod poller;
pub mod request;
pub mod wallet;

pub use client::{ConfidentialClient, OperationReport};
pub use cluster::ClusterKeyCache;
pub use error::{CoreError, Result};
pub use poller::{CheckStatus, ConfirmationPoller, PollOutcome};
pub use request::{ComputationKind, ComputationRequest, Payload};
pub use wallet::{MemoryWalletStore, WalletError, WalletRecord, WalletRegistry, WalletStore};
