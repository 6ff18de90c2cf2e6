//! Balance Encryption
//!
//! Confidential balances live on the ledger as a single field element
//! ciphertext plus a 16-byte nonce. The key is an X25519 shared secret
//! agreed between the owner's encryption key and the MPC cluster's key.
//!
//! ```text
//! Flow:
//! 1. shared   = X25519(owner_private, cluster_public)
//! 2. cipher   : BalanceCipher (must match the cluster's cipher)
//! 3. encrypt  : c = E(shared, m, nonce)
//! 4. decrypt  : m = D(shared, c, nonce)
//! ```
//!
//! Ciphers carry no tag. Decrypting with the wrong shared secret does not
//! fail, it returns a different field element.
//! [`BalanceCipher::decrypt_balance`] adds a range check that catches most of
//! those cases; [`BalanceCipher::decrypt`] does not.
//!
//! [`KeystreamCipher`] is a self-contained implementation for local
//! clusters and tests.

mod codec;
mod keystream;

pub use codec::{
    BalanceCipher, CIPHERTEXT_LENGTH, Ciphertext, NONCE_LENGTH, Nonce, SharedSecret,
    field_modulus, nonce_from_u128, nonce_to_u128,
};
pub use keystream::KeystreamCipher;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// The plaintext does not fit a balance; usually a wrong shared secret.
    #[error("decrypted value is not a plausible balance ({bits} bits)")]
    ImplausibleBalance { bits: u64 },
}
