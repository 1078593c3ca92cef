//! Client-side encoding of the token-swap `Swap` instruction.

use borsh::BorshSerialize;
use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

use crate::error::{ErrorInfo, SwapError};

const SWAP_INSTRUCTION_TAG: u8 = 1;

#[derive(BorshSerialize)]
struct SwapInstructionData {
    amount_in: u64,
    minimum_amount_out: u64,
}

/// Accounts of a `Swap`, in instruction order.
#[derive(Debug, Clone, Copy)]
pub struct SwapAccounts {
    pub token_swap: Pubkey,
    pub authority: Pubkey,
    pub user_transfer_authority: Pubkey,
    pub user_source: Pubkey,
    pub pool_source: Pubkey,
    pub pool_destination: Pubkey,
    pub user_destination: Pubkey,
    pub pool_mint: Pubkey,
    pub fee_account: Pubkey,
    pub token_program: Pubkey,
    pub host_fee_account: Option<Pubkey>,
}

pub fn swap(
    swap_program_id: Pubkey,
    accounts: &SwapAccounts,
    amount_in: u64,
    minimum_amount_out: u64,
) -> Result<Instruction, SwapError> {
    let mut data = Vec::with_capacity(1 + 16);
    data.push(SWAP_INSTRUCTION_TAG);
    SwapInstructionData {
        amount_in,
        minimum_amount_out,
    }
    .serialize(&mut data)
    .map_err(|e| SwapError::InstructionBuild(ErrorInfo::String(e.to_string())))?;

    let mut metas = vec![
        AccountMeta::new_readonly(accounts.token_swap, false),
        AccountMeta::new_readonly(accounts.authority, false),
        AccountMeta::new_readonly(accounts.user_transfer_authority, true),
        AccountMeta::new(accounts.user_source, false),
        AccountMeta::new(accounts.pool_source, false),
        AccountMeta::new(accounts.pool_destination, false),
        AccountMeta::new(accounts.user_destination, false),
        AccountMeta::new(accounts.pool_mint, false),
        AccountMeta::new(accounts.fee_account, false),
        AccountMeta::new_readonly(accounts.token_program, false),
    ];
    if let Some(host_fee_account) = accounts.host_fee_account {
        metas.push(AccountMeta::new(host_fee_account, false));
    }

    Ok(Instruction {
        program_id: swap_program_id,
        accounts: metas,
        data,
    })
}
