use dcash_cipher::CipherError;
use dcash_fees::{AmountError, ValidationError};
use dcash_keys::KeyError;
use thiserror::Error;

use crate::ledger::TransportError;
use crate::wallet::WalletError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(#[from] KeyError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("amount rejected: {0}")]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("balance decryption failed: {0}")]
    Cipher(#[from] CipherError),

    /// The program reported a nonzero status. Retrying needs a new request.
    #[error("computation {offset} rejected with status {status_code}")]
    ComputationRejected { offset: u64, status_code: u8 },

    #[error("no confidential balance account for {owner}")]
    AccountNotFound { owner: String },

    #[error("instruction encoding failed: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
