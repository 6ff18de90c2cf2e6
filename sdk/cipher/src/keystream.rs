//! Additive blake3 keystream over the 2^255 - 19 field.
//!
//! Used by local tooling and tests that play the cluster themselves. It is
//! not the cipher the deployed program writes, so it cannot read balances
//! from a live cluster.

use num_bigint::BigUint;

use crate::codec::{BalanceCipher, Ciphertext, Nonce, SharedSecret, field_modulus, to_ciphertext};

const KEYSTREAM_CONTEXT: &str = "dcash-balance-cipher-v1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeystreamCipher;

impl KeystreamCipher {
    /// Keystream element: 64 bytes of XOF output reduced mod p.
    fn keystream(secret: &SharedSecret, nonce: &Nonce) -> BigUint {
        let mut hasher = blake3::Hasher::new_derive_key(KEYSTREAM_CONTEXT);
        hasher.update(secret.as_bytes());
        hasher.update(nonce);

        let mut wide = [0u8; 64];
        hasher.finalize_xof().fill(&mut wide);

        BigUint::from_bytes_le(&wide) % field_modulus()
    }
}

impl BalanceCipher for KeystreamCipher {
    fn encrypt(&self, secret: &SharedSecret, plaintext: u64, nonce: &Nonce) -> Ciphertext {
        let modulus = field_modulus();
        let value = (BigUint::from(plaintext) + Self::keystream(secret, nonce)) % modulus;
        to_ciphertext(&value)
    }

    fn decrypt(&self, secret: &SharedSecret, ciphertext: &Ciphertext, nonce: &Nonce) -> BigUint {
        let modulus = field_modulus();
        let c = BigUint::from_bytes_le(ciphertext) % modulus;
        (c + modulus - Self::keystream(secret, nonce)) % modulus
    }
}
