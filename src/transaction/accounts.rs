use std::sync::Arc;

use solana_program_pack::Pack;
use solana_pubkey::Pubkey;
use solana_sdk::{signature::Keypair, signer::Signer};
use spl_associated_token_account::{get_associated_token_address, instruction::create_associated_token_account};
use spl_token::{instruction as token_instruction, native_mint, state::Account as TokenAccount};

use crate::{chain::SolanaRpc, error::SwapError, transaction::AccountInstructions};

/// Size of an SPL token account, the span rent exemption is queried for.
pub const TOKEN_ACCOUNT_SPAN: usize = TokenAccount::LEN;

/// The owner's associated token account for `mint`, with a creation
/// instruction when it does not exist yet.
pub async fn prepare_associated_token_account(
    rpc: &dyn SolanaRpc,
    owner: &Pubkey,
    mint: &Pubkey,
    fee_payer: &Pubkey,
    close_afterward: bool,
) -> Result<AccountInstructions, SwapError> {
    let address = get_associated_token_address(owner, mint);
    if rpc.associated_token_account_exists(owner, mint).await? {
        return Ok(AccountInstructions::new(address));
    }

    let mut account = AccountInstructions::new(address);
    account.instructions.push(create_associated_token_account(
        fee_payer,
        owner,
        mint,
        &spl_token::ID,
    ));
    if close_afterward {
        account.cleanup_instructions.push(token_instruction::close_account(
            &spl_token::ID,
            &address,
            owner,
            owner,
            &[],
        )?);
    }
    Ok(account)
}

/// A fresh wrapped-SOL account funded with `amount` plus rent. With
/// `close_afterward` it is closed back to the owner in cleanup.
#[allow(deprecated)]
pub fn prepare_wrapped_sol_account(
    owner: &Pubkey,
    amount: u64,
    payer: &Pubkey,
    min_rent_exemption: u64,
    close_afterward: bool,
) -> Result<AccountInstructions, SwapError> {
    let keypair = Arc::new(Keypair::new());
    let address = keypair.pubkey();

    let create = solana_sdk::system_instruction::create_account(
        payer,
        &address,
        amount.saturating_add(min_rent_exemption),
        TOKEN_ACCOUNT_SPAN as u64,
        &spl_token::ID,
    );
    let initialize = token_instruction::initialize_account(&spl_token::ID, &address, &native_mint::ID, owner)?;
    let mut cleanup_instructions = Vec::new();
    if close_afterward {
        cleanup_instructions.push(token_instruction::close_account(&spl_token::ID, &address, owner, owner, &[])?);
    }

    Ok(AccountInstructions {
        account: address,
        instructions: vec![create, initialize],
        cleanup_instructions,
        signers: vec![keypair],
    })
}
