//! MXE account: where the MPC network publishes the cluster's x25519 key
//!
//! Only the leading fields are read; the rest of the account is ignored.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┬───────────────────┬──────────────────────────┐
//! │ discriminator(8) │ authority: Option<[32]>  │ cluster: Opt<u32> │ x25519: Set|Unset + [32] │
//! └──────────────────┴──────────────────────────┴───────────────────┴──────────────────────────┘
//!   sha256("account:MXEAccount")[..8]
//! ```

use borsh::BorshDeserialize;

use super::TransportError;
use crate::instruction::{DISCRIMINATOR_LENGTH, account_discriminator};

pub const MXE_ACCOUNT_NAME: &str = "MXEAccount";

/// Program id of the MPC network that owns MXE accounts.
pub const MPC_NETWORK_PROGRAM_ID: &str = "Arcj82pX7HxYKLR92qvgZUAd7vGS1k4hQvAFcPATFdEQ";

#[derive(BorshDeserialize)]
enum KeySlot {
    Set([u8; 32]),
    /// Key generation has not finished.
    Unset,
}

#[derive(BorshDeserialize)]
struct MxeHeader {
    _authority: Option<[u8; 32]>,
    _cluster: Option<u32>,
    x25519_pubkey: KeySlot,
}

/// Extracts the cluster key from raw MXE account data.
pub fn decode_cluster_key(data: &[u8]) -> Result<[u8; 32], TransportError> {
    if data.len() < DISCRIMINATOR_LENGTH
        || data[..DISCRIMINATOR_LENGTH] != account_discriminator(MXE_ACCOUNT_NAME)
    {
        return Err(TransportError::InvalidAccountData("not an MXE account".into()));
    }

    let mut rest = &data[DISCRIMINATOR_LENGTH..];
    let header = MxeHeader::deserialize(&mut rest)
        .map_err(|e| TransportError::InvalidAccountData(format!("MXE account: {e}")))?;

    match header.x25519_pubkey {
        KeySlot::Set(key) => Ok(key),
        KeySlot::Unset => Err(TransportError::ClusterKey(
            "cluster key generation has not finished".into(),
        )),
    }
}
