//! Wallet key material.
//!
//! A wallet is identified by an Ed25519 signing keypair. Its X25519
//! encryption identity is never stored: it is re-derived from the signing key
//! on demand.
//!
//! ```text
//! ┌──────────────────┐  sign("dgn.cash")  ┌───────────────┐  first 32B  ┌──────────────────┐
//! │  SigningKeypair  │───────────────────▶│ 64B signature │────────────▶│ X25519 private   │
//! │  (Ed25519, 64B)  │   deterministic    └───────────────┘             │  ──▶ X25519 public│
//! └──────────────────┘                                                  └──────────────────┘
//! ```

mod derive;
mod signing;

pub use derive::{DERIVATION_MESSAGE, EncryptionKeyPair};
pub use signing::{KEYPAIR_LENGTH, SigningKeypair};

use thiserror::Error;

/// Errors raised while loading or using signing key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid keypair length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("malformed signing keypair: {0}")]
    MalformedKeypair(String),

    #[error("invalid keypair json: {0}")]
    InvalidJson(String),
}
