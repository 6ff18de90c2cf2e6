use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;

use crate::KeyError;

/// Secret seed (32 bytes) followed by the public key (32 bytes).
pub const KEYPAIR_LENGTH: usize = 64;

/// A wallet's Ed25519 signing keypair.
/// NEVER expose this struct's internals.
#[derive(Clone)]
pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    /// Generates a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Loads a keypair from its 64-byte `secret || public` encoding.
    ///
    /// The public half must match the one implied by the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; KEYPAIR_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength {
                expected: KEYPAIR_LENGTH,
                got: bytes.len(),
            })?;

        let signing_key = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| KeyError::MalformedKeypair(e.to_string()))?;

        Ok(Self { signing_key })
    }

    /// Loads a keypair from the JSON byte-array export format
    /// (`[12, 34, ...]`, 64 entries).
    pub fn from_json_array(json: &str) -> Result<Self, KeyError> {
        let bytes: Vec<u8> =
            serde_json::from_str(json).map_err(|e| KeyError::InvalidJson(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Exports the keypair as a JSON byte array, the inverse of
    /// [`SigningKeypair::from_json_array`].
    pub fn to_json_array(&self) -> String {
        let bytes = self.to_bytes();
        let parts: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
        format!("[{}]", parts.join(","))
    }

    /// Returns the 64-byte `secret || public` encoding.
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn pubkey_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Returns the public key as Base58 (the wallet address).
    pub fn pubkey_bs58(&self) -> String {
        bs58::encode(self.pubkey_bytes()).into_string()
    }

    /// Signs an arbitrary message. Ed25519 signing is deterministic.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_bytes()
    }
}

impl std::fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("pubkey", &self.pubkey_bs58())
            .finish_non_exhaustive()
    }
}
