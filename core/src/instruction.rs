//! Program instruction encoding
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────┐
//! │ discriminator(8) │ borsh(args)                          │
//! └──────────────────┴──────────────────────────────────────┘
//!   sha256("global:<method>")[..8]
//! ```

use borsh::BorshSerialize;
use dcash_cipher::nonce_to_u128;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};
use crate::request::{ComputationRequest, Payload};

pub const DISCRIMINATOR_LENGTH: usize = 8;

// ============================================================================
// Discriminators
// ============================================================================

fn sha256_prefix<const N: usize>(preimage: &[u8]) -> [u8; N] {
    let digest = Sha256::digest(preimage);
    let mut out = [0u8; N];
    out.copy_from_slice(&digest[..N]);
    out
}

pub fn method_discriminator(method: &str) -> [u8; DISCRIMINATOR_LENGTH] {
    sha256_prefix(format!("global:{method}").as_bytes())
}

pub fn account_discriminator(account: &str) -> [u8; DISCRIMINATOR_LENGTH] {
    sha256_prefix(format!("account:{account}").as_bytes())
}

/// Offset of a computation definition account: `sha256(name)[..4]` as u32 LE.
pub fn comp_def_offset(name: &str) -> u32 {
    u32::from_le_bytes(sha256_prefix(name.as_bytes()))
}

// ============================================================================
// Arguments
// ============================================================================

#[derive(BorshSerialize)]
struct CreateAccountArgs {
    computation_offset: u64,
    x25519_pubkey: [u8; 32],
    nonce: u128,
}

#[derive(BorshSerialize)]
struct AmountArgs {
    computation_offset: u64,
    amount: u64,
}

#[derive(BorshSerialize)]
struct TransferArgs {
    computation_offset: u64,
    amount: u64,
    variance: u8,
    recipient: [u8; 32],
}

/// Encodes `request` as instruction data for its queue method.
pub fn encode(request: &ComputationRequest) -> Result<Vec<u8>> {
    let mut data = method_discriminator(request.kind.method_name()).to_vec();
    let offset = request.offset;

    let written = match &request.payload {
        Payload::AccountInit {
            encryption_public_key,
        } => {
            let nonce = request.nonce.as_ref().ok_or_else(|| {
                CoreError::Encoding("account init request carries no nonce".into())
            })?;
            CreateAccountArgs {
                computation_offset: offset,
                x25519_pubkey: *encryption_public_key,
                nonce: nonce_to_u128(nonce),
            }
            .serialize(&mut data)
        }
        Payload::Deposit { amount } | Payload::Withdraw { amount } => AmountArgs {
            computation_offset: offset,
            amount: *amount,
        }
        .serialize(&mut data),
        Payload::Transfer {
            amount,
            variance,
            recipient,
        } => TransferArgs {
            computation_offset: offset,
            amount: *amount,
            variance: *variance,
            recipient: recipient.to_bytes(),
        }
        .serialize(&mut data),
    };

    written.map_err(|e| CoreError::Encoding(e.to_string()))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ComputationKind;
    use solana_sdk::pubkey::Pubkey;

    fn request(payload: Payload, nonce: Option<[u8; 16]>) -> ComputationRequest {
        ComputationRequest {
            kind: payload.kind(),
            offset: 0x0102_0304_0506_0708,
            nonce,
            payload,
        }
    }

    #[test]
    fn test_discriminator_is_sha256_prefix() {
        let expected = Sha256::digest(b"global:queue_deposit");
        assert_eq!(method_discriminator("queue_deposit"), expected[..8]);
        assert_ne!(
            method_discriminator("queue_deposit"),
            method_discriminator("queue_withdraw")
        );
    }

    #[test]
    fn test_deposit_layout() {
        let data = encode(&request(Payload::Deposit { amount: 1_000_000 }, None)).unwrap();
        assert_eq!(data.len(), 8 + 8 + 8);
        assert_eq!(&data[8..16], &0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(&data[16..24], &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn test_transfer_layout() {
        let recipient = Pubkey::new_from_array([9u8; 32]);
        let data = encode(&request(
            Payload::Transfer {
                amount: 42,
                variance: 200,
                recipient,
            },
            None,
        ))
        .unwrap();
        assert_eq!(data.len(), 8 + 8 + 8 + 1 + 32);
        assert_eq!(data[24], 200);
        assert_eq!(&data[25..], &[9u8; 32]);
    }

    #[test]
    fn test_account_init_layout() {
        let mut nonce = [0u8; 16];
        nonce[0] = 5;
        let data = encode(&request(
            Payload::AccountInit {
                encryption_public_key: [3u8; 32],
            },
            Some(nonce),
        ))
        .unwrap();
        assert_eq!(data.len(), 8 + 8 + 32 + 16);
        assert_eq!(&data[16..48], &[3u8; 32]);
        assert_eq!(&data[48..], &nonce);
    }

    #[test]
    fn test_account_init_without_nonce_fails() {
        let err = encode(&request(
            Payload::AccountInit {
                encryption_public_key: [3u8; 32],
            },
            None,
        ))
        .unwrap_err();
        assert!(matches!(err, CoreError::Encoding(_)));
    }

    #[test]
    fn test_comp_def_offsets_differ() {
        let offsets: Vec<u32> = [
            ComputationKind::AccountInit,
            ComputationKind::Deposit,
            ComputationKind::Transfer,
            ComputationKind::Withdraw,
        ]
        .iter()
        .map(|k| comp_def_offset(k.comp_def_name()))
        .collect();

        for (i, a) in offsets.iter().enumerate() {
            for b in &offsets[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
