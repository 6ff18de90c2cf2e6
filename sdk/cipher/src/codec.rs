use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::CipherError;

pub const CIPHERTEXT_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 16;

/// Field element, 32 bytes little-endian.
pub type Ciphertext = [u8; CIPHERTEXT_LENGTH];
/// Per-ciphertext nonce, 16 bytes little-endian.
pub type Nonce = [u8; NONCE_LENGTH];

static FIELD_MODULUS: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::one() << 255u32) - BigUint::from(19u32));

/// The prime `2^255 - 19` ciphertexts are reduced by.
pub fn field_modulus() -> &'static BigUint {
    &FIELD_MODULUS
}

/// X25519 shared secret between an owner and the cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Standard ECDH: `my_private * their_public`.
    pub fn agree(my_private: &[u8; 32], their_public: &[u8; 32]) -> Self {
        let secret = StaticSecret::from(*my_private);
        let public = PublicKey::from(*their_public);
        Self(secret.diffie_hellman(&public).to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for SharedSecret {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Ledger accounts store the nonce as a u128; the cipher consumes its
/// little-endian bytes.
pub fn nonce_from_u128(nonce: u128) -> Nonce {
    nonce.to_le_bytes()
}

pub fn nonce_to_u128(nonce: &Nonce) -> u128 {
    u128::from_le_bytes(*nonce)
}

/// Symmetric cipher for a single balance field element.
///
/// Implementations must match the cipher the ledger program and MPC cluster
/// use, byte for byte. Decryption never authenticates: a wrong secret yields
/// a wrong element, not an error.
pub trait BalanceCipher: Send + Sync {
    fn encrypt(&self, secret: &SharedSecret, plaintext: u64, nonce: &Nonce) -> Ciphertext;

    /// Raw decrypted field element. Never fails.
    fn decrypt(&self, secret: &SharedSecret, ciphertext: &Ciphertext, nonce: &Nonce) -> BigUint;

    /// Decrypts and checks the result fits a u64 balance.
    fn decrypt_balance(
        &self,
        secret: &SharedSecret,
        ciphertext: &Ciphertext,
        nonce: &Nonce,
    ) -> Result<u64, CipherError> {
        let value = self.decrypt(secret, ciphertext, nonce);
        value.to_u64().ok_or(CipherError::ImplausibleBalance {
            bits: value.bits(),
        })
    }
}

/// Canonical little-endian encoding of a reduced field element.
pub(crate) fn to_ciphertext(value: &BigUint) -> Ciphertext {
    let bytes = value.to_bytes_le();
    let mut out = [0u8; CIPHERTEXT_LENGTH];
    out[..bytes.len()].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity cipher, enough to exercise the default range check.
    struct Plain;

    impl BalanceCipher for Plain {
        fn encrypt(&self, _: &SharedSecret, plaintext: u64, _: &Nonce) -> Ciphertext {
            to_ciphertext(&BigUint::from(plaintext))
        }

        fn decrypt(&self, _: &SharedSecret, ciphertext: &Ciphertext, _: &Nonce) -> BigUint {
            BigUint::from_bytes_le(ciphertext)
        }
    }

    #[test]
    fn test_decrypt_balance_range_check() {
        let s = SharedSecret::from([0u8; 32]);
        let nonce = nonce_from_u128(0);

        let ct = Plain.encrypt(&s, u64::MAX, &nonce);
        assert_eq!(Plain.decrypt_balance(&s, &ct, &nonce).unwrap(), u64::MAX);

        let mut wide = [0u8; CIPHERTEXT_LENGTH];
        wide[8] = 1;
        assert_eq!(
            Plain.decrypt_balance(&s, &wide, &nonce),
            Err(CipherError::ImplausibleBalance { bits: 65 })
        );
    }

    #[test]
    fn test_nonce_le_encoding() {
        let nonce = nonce_from_u128(1);
        assert_eq!(nonce[0], 1);
        assert!(nonce[1..].iter().all(|b| *b == 0));
        assert_eq!(nonce_to_u128(&nonce), 1);
    }

    #[test]
    fn test_shared_secret_agreement() {
        let a = [7u8; 32];
        let b = [9u8; 32];
        let a_pub = PublicKey::from(&StaticSecret::from(a)).to_bytes();
        let b_pub = PublicKey::from(&StaticSecret::from(b)).to_bytes();

        assert_eq!(SharedSecret::agree(&a, &b_pub), SharedSecret::agree(&b, &a_pub));
    }
}
