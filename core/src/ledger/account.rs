//! Confidential balance account layout
//!
//! ```text
//! ┌──────────────────┬───────────┬────────────────┬──────────────────┐
//! │ discriminator(8) │ owner(32) │ ciphertext(32) │ nonce(16, u128)  │
//! └──────────────────┴───────────┴────────────────┴──────────────────┘
//! ```

use dcash_cipher::{
    BalanceCipher, CIPHERTEXT_LENGTH, CipherError, Ciphertext, Nonce, SharedSecret,
    nonce_from_u128,
};
use solana_sdk::pubkey::Pubkey;

use super::TransportError;
use crate::instruction::{DISCRIMINATOR_LENGTH, account_discriminator};

pub const USER_ACCOUNT_NAME: &str = "DCUserTokenAccount";
pub const USER_ACCOUNT_LENGTH: usize = DISCRIMINATOR_LENGTH + 32 + CIPHERTEXT_LENGTH + 16;

const OWNER_AT: usize = DISCRIMINATOR_LENGTH;
const CIPHERTEXT_AT: usize = OWNER_AT + 32;
const NONCE_AT: usize = CIPHERTEXT_AT + CIPHERTEXT_LENGTH;

/// A user's encrypted balance as stored on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedBalance {
    pub owner: Pubkey,
    pub ciphertext: Ciphertext,
    pub nonce: u128,
}

impl EncryptedBalance {
    /// Freshly created accounts hold an all-zero ciphertext under nonce 0.
    pub fn empty(owner: Pubkey) -> Self {
        Self {
            owner,
            ciphertext: [0u8; CIPHERTEXT_LENGTH],
            nonce: 0,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        if data.len() < USER_ACCOUNT_LENGTH {
            return Err(TransportError::InvalidAccountData(format!(
                "expected {} bytes, got {}",
                USER_ACCOUNT_LENGTH,
                data.len()
            )));
        }
        if data[..DISCRIMINATOR_LENGTH] != account_discriminator(USER_ACCOUNT_NAME) {
            return Err(TransportError::InvalidAccountData(
                "not a balance account".into(),
            ));
        }

        let mut owner = [0u8; 32];
        owner.copy_from_slice(&data[OWNER_AT..CIPHERTEXT_AT]);
        let mut ciphertext = [0u8; CIPHERTEXT_LENGTH];
        ciphertext.copy_from_slice(&data[CIPHERTEXT_AT..NONCE_AT]);
        let mut nonce = [0u8; 16];
        nonce.copy_from_slice(&data[NONCE_AT..USER_ACCOUNT_LENGTH]);

        Ok(Self {
            owner: Pubkey::new_from_array(owner),
            ciphertext,
            nonce: u128::from_le_bytes(nonce),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(USER_ACCOUNT_LENGTH);
        data.extend_from_slice(&account_discriminator(USER_ACCOUNT_NAME));
        data.extend_from_slice(self.owner.as_ref());
        data.extend_from_slice(&self.ciphertext);
        data.extend_from_slice(&self.nonce.to_le_bytes());
        data
    }

    /// The stored nonce as the 16 little-endian bytes the cipher expects.
    pub fn nonce_bytes(&self) -> Nonce {
        nonce_from_u128(self.nonce)
    }

    pub fn decrypt<C: BalanceCipher>(
        &self,
        cipher: &C,
        secret: &SharedSecret,
    ) -> Result<u64, CipherError> {
        cipher.decrypt_balance(secret, &self.ciphertext, &self.nonce_bytes())
    }
}
