//! Swap instructions for a single pool and for a whole pools-pair.

use solana_pubkey::Pubkey;
use spl_token::{instruction as token_instruction, native_mint};

use crate::{
    error::{ErrorInfo, SwapError},
    pool::Pool,
    pools_pair::PoolsPair,
    transaction::{
        AccountInstructions, SwapContext,
        accounts::{prepare_associated_token_account, prepare_wrapped_sol_account},
    },
};

/// Instructions swapping `amount` of `pool`'s token A held in `from` into
/// token B.
///
/// Native SOL (`from` being the owner) is wrapped into a temporary account.
/// A wrapped-SOL destination is unwrapped back to the owner afterwards. A
/// missing destination becomes the owner's associated token account.
///
/// Returns the destination account with its instructions and the rent
/// reserved for accounts created along the way.
pub async fn construct_pool_exchange(
    ctx: &SwapContext<'_>,
    pool: &Pool,
    from: Pubkey,
    to: Option<Pubkey>,
    amount: u64,
) -> Result<(AccountInstructions, u64), SwapError> {
    let from_mint = ctx.info.mint_or_err(&pool.token_a_name)?;
    let to_mint = ctx.info.mint_or_err(&pool.token_b_name)?;
    let owner = ctx.owner_pubkey();
    let payer = ctx.payer();

    let source = if from_mint == native_mint::ID && from == owner {
        prepare_wrapped_sol_account(&owner, amount, &payer, ctx.min_rent_exemption, true)?
    } else {
        AccountInstructions::new(from)
    };

    let destination = match to {
        Some(to) if to_mint == native_mint::ID && to != owner => {
            let mut account = AccountInstructions::new(to);
            account
                .cleanup_instructions
                .push(token_instruction::close_account(&spl_token::ID, &to, &owner, &owner, &[])?);
            account
        }
        _ if to_mint == native_mint::ID => prepare_wrapped_sol_account(&owner, 0, &payer, ctx.min_rent_exemption, true)?,
        Some(to) => AccountInstructions::new(to),
        None => prepare_associated_token_account(ctx.rpc, &owner, &to_mint, &payer, false).await?,
    };

    let mut account_creation_fee = 0;
    let mut instructions = Vec::new();
    let mut cleanup_instructions = Vec::new();
    let mut signers = Vec::new();
    for account in [&source, &destination] {
        if !account.instructions.is_empty() {
            account_creation_fee += ctx.min_rent_exemption;
        }
        instructions.extend(account.instructions.iter().cloned());
        cleanup_instructions.extend(account.cleanup_instructions.iter().cloned());
        signers.extend(account.signers.iter().cloned());
    }

    let minimum_amount_out = pool
        .minimum_amount_out(amount, ctx.slippage)
        .map_err(|e| SwapError::CouldNotEstimateMinimumOutAmount(ErrorInfo::String(e.to_string())))?;
    instructions.push(pool.swap_instruction(
        &ctx.info.program_ids,
        owner,
        source.account,
        destination.account,
        amount,
        minimum_amount_out,
    )?);

    Ok((
        AccountInstructions {
            account: destination.account,
            instructions,
            cleanup_instructions,
            signers,
        },
        account_creation_fee,
    ))
}

/// Instructions for every leg of `pair`.
///
/// A transitive pair routes through `intermediary`, which must be given. The
/// second leg swaps the first leg's minimum output.
pub async fn construct_exchange(
    ctx: &SwapContext<'_>,
    pair: &PoolsPair,
    from: Pubkey,
    intermediary: Option<Pubkey>,
    to: Option<Pubkey>,
    amount: u64,
) -> Result<(AccountInstructions, u64), SwapError> {
    match pair {
        PoolsPair::Direct(pool) => construct_pool_exchange(ctx, pool, from, to, amount).await,
        PoolsPair::Transitive(first, second) => {
            let intermediary = intermediary.ok_or(SwapError::IntermediaryTokenAddressNotFound)?;
            let intermediary_amount = first
                .minimum_amount_out(amount, ctx.slippage)
                .map_err(|e| SwapError::CouldNotEstimateMinimumOutAmount(ErrorInfo::String(e.to_string())))?;

            let (first_leg, first_fee) = construct_pool_exchange(ctx, first, from, Some(intermediary), amount).await?;
            let (second_leg, second_fee) =
                construct_pool_exchange(ctx, second, intermediary, to, intermediary_amount).await?;

            Ok((
                AccountInstructions {
                    account: second_leg.account,
                    instructions: [first_leg.instructions, second_leg.instructions].concat(),
                    cleanup_instructions: [first_leg.cleanup_instructions, second_leg.cleanup_instructions]
                        .concat(),
                    signers: [first_leg.signers, second_leg.signers].concat(),
                },
                first_fee + second_fee,
            ))
        }
    }
}
