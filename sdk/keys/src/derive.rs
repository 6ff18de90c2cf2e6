use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::{KeyError, SigningKeypair};

/// Message signed to derive a wallet's encryption key. Changing it changes
/// every derived key and orphans every existing encrypted balance.
pub const DERIVATION_MESSAGE: &[u8] = b"dgn.cash";

/// X25519 keypair used to agree a shared secret with the MPC cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKeyPair {
    pub private_key: [u8; 32],
    pub public_key: [u8; 32],
}

impl EncryptionKeyPair {
    /// Derives the encryption keypair from a signing keypair.
    ///
    /// Pure: the same signing key always yields the same encryption keypair,
    /// so a wallet's encryption identity is recoverable from its signing key
    /// alone.
    pub fn derive(signer: &SigningKeypair) -> Self {
        let signature = signer.sign(DERIVATION_MESSAGE);

        let mut private_key = [0u8; 32];
        private_key.copy_from_slice(&signature[..32]);

        Self::from_private(private_key)
    }

    /// Derives straight from the 64-byte keypair encoding.
    pub fn derive_from_keypair_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let signer = SigningKeypair::from_bytes(bytes)?;
        Ok(Self::derive(&signer))
    }

    /// Rebuilds the keypair from a stored private scalar.
    pub fn from_private(private_key: [u8; 32]) -> Self {
        let secret = StaticSecret::from(private_key);
        let public_key = X25519PublicKey::from(&secret).to_bytes();

        Self {
            private_key,
            public_key,
        }
    }
}

impl std::fmt::Debug for EncryptionKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKeyPair")
            .field("public_key", &bs58::encode(self.public_key).into_string())
            .finish_non_exhaustive()
    }
}
