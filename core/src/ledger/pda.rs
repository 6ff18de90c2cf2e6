use solana_sdk::pubkey::Pubkey;

pub const USER_ACCOUNT_SEED: &[u8] = b"dc_user_token_account";
pub const MXE_ACCOUNT_SEED: &[u8] = b"MXEAccount";

/// Derive the confidential balance account PDA for `owner`
pub fn user_account_address(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[USER_ACCOUNT_SEED, owner.as_ref()], program_id)
}

/// Derive the MXE account PDA that `program_id` registered with the MPC
/// network program
pub fn mxe_account_address(network_program: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MXE_ACCOUNT_SEED, program_id.as_ref()], network_program)
}
