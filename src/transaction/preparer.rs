//! Splits a swap into the transactions that execute it.
//!
//! A direct swap always fits in one transaction. A transitive swap may need a
//! first transaction creating the intermediary and destination associated
//! token accounts; wrapped-SOL accounts are cheap and short lived, so their
//! creation stays in the swap transaction itself.

use std::sync::Arc;

use solana_pubkey::Pubkey;
use solana_sdk::{signature::Keypair, signer::Signer};
use spl_token::native_mint;

use crate::{
    chain::SolanaRpc,
    error::SwapError,
    pool::Pool,
    pools_pair::PoolsPair,
    swap_info::SwapInfo,
    transaction::{
        AccountInstructions, PreparedSwapTransaction, SwapContext,
        accounts::{prepare_associated_token_account, prepare_wrapped_sol_account},
        exchange::construct_exchange,
    },
};

/// A swap to prepare, amounts in atoms of the source token.
#[derive(Debug, Clone)]
pub struct SwapRequest<'a> {
    /// Source token account; the owner's address means native SOL.
    pub from_wallet_pubkey: Pubkey,
    /// Destination token account; `None` creates the associated account.
    pub to_wallet_pubkey: Option<Pubkey>,
    pub pools_pair: &'a PoolsPair,
    pub amount: u64,
    pub fee_payer: Option<Pubkey>,
    pub slippage: f64,
}

#[derive(Debug, Clone)]
pub struct PreparedSwap {
    pub transactions: Vec<PreparedSwapTransaction>,
    /// Destination account created by the swap, if any.
    pub new_wallet_pubkey: Option<Pubkey>,
}

pub async fn prepare_for_swapping(
    info: &SwapInfo,
    rpc: &dyn SolanaRpc,
    owner: &Arc<Keypair>,
    request: &SwapRequest<'_>,
    token_account_span: usize,
) -> Result<PreparedSwap, SwapError> {
    let pair = request.pools_pair;
    if pair.first().token_a_decimals().is_none() {
        return Err(SwapError::InvalidPool(pair.first().account.into()));
    }

    let min_rent_exemption = rpc.get_minimum_balance_for_rent_exemption(token_account_span).await?;
    let ctx = SwapContext {
        info,
        rpc,
        owner,
        fee_payer: request.fee_payer,
        slippage: request.slippage,
        min_rent_exemption,
    };

    let prepared = match pair {
        PoolsPair::Direct(_) => direct_swap(&ctx, request).await?,
        PoolsPair::Transitive(first, second) => transitive_swap(&ctx, request, first, second).await?,
    };
    log::debug!(
        "prepared {} transaction(s) with {} instruction(s)",
        prepared.transactions.len(),
        prepared
            .transactions
            .iter()
            .map(|transaction| transaction.instructions.len())
            .sum::<usize>()
    );
    Ok(prepared)
}

async fn direct_swap(ctx: &SwapContext<'_>, request: &SwapRequest<'_>) -> Result<PreparedSwap, SwapError> {
    let (account, account_creation_fee) = construct_exchange(
        ctx,
        request.pools_pair,
        request.from_wallet_pubkey,
        None,
        request.to_wallet_pubkey,
        request.amount,
    )
    .await?;

    let new_wallet_pubkey = request.to_wallet_pubkey.is_none().then_some(account.account);
    let mut signers = vec![ctx.owner.clone()];
    signers.extend(account.signers);

    Ok(PreparedSwap {
        transactions: vec![PreparedSwapTransaction {
            instructions: [account.instructions, account.cleanup_instructions].concat(),
            signers,
            account_creation_fee,
        }],
        new_wallet_pubkey,
    })
}

/// Accounts a transitive swap routes through, and where their creation goes.
struct TransitiveAccounts {
    intermediary: Pubkey,
    destination: Pubkey,
    /// Wrapped-SOL account instructions, executed inside the swap transaction.
    wrapped_sol: Option<AccountInstructions>,
    /// Associated account creation, executed before the swap.
    setup: Option<PreparedSwapTransaction>,
}

async fn prepare_transitive_accounts(
    ctx: &SwapContext<'_>,
    request: &SwapRequest<'_>,
    first: &Pool,
    second: &Pool,
) -> Result<TransitiveAccounts, SwapError> {
    let owner = ctx.owner_pubkey();
    let payer = ctx.payer();
    let intermediary_mint = ctx.info.mint_or_err(&first.token_b_name)?;
    let destination_mint = ctx.info.mint_or_err(&second.token_b_name)?;

    let mut setup_instructions = Vec::new();
    let mut setup_fee = 0;
    let mut wrapped_sol = None;

    let intermediary = if intermediary_mint == native_mint::ID {
        // closed by the first leg of the exchange
        let account = prepare_wrapped_sol_account(&owner, 0, &payer, ctx.min_rent_exemption, false)?;
        let address = account.account;
        wrapped_sol = Some(account);
        address
    } else {
        // left open, the first leg may leave dust behind
        let account = prepare_associated_token_account(ctx.rpc, &owner, &intermediary_mint, &payer, false).await?;
        if !account.instructions.is_empty() {
            setup_fee += ctx.min_rent_exemption;
        }
        setup_instructions.extend(account.instructions);
        account.account
    };

    let destination = match request.to_wallet_pubkey {
        Some(to) if to != owner => to,
        _ => {
            let account = prepare_associated_token_account(ctx.rpc, &owner, &destination_mint, &payer, false).await?;
            let address = account.account;
            if destination_mint == native_mint::ID {
                wrapped_sol = Some(account);
            } else {
                if !account.instructions.is_empty() {
                    setup_fee += ctx.min_rent_exemption;
                }
                setup_instructions.extend(account.instructions);
            }
            address
        }
    };

    let setup = (!setup_instructions.is_empty()).then(|| PreparedSwapTransaction {
        instructions: setup_instructions,
        signers: vec![ctx.owner.clone()],
        account_creation_fee: setup_fee,
    });

    Ok(TransitiveAccounts {
        intermediary,
        destination,
        wrapped_sol,
        setup,
    })
}

async fn transitive_swap(
    ctx: &SwapContext<'_>,
    request: &SwapRequest<'_>,
    first: &Pool,
    second: &Pool,
) -> Result<PreparedSwap, SwapError> {
    let accounts = prepare_transitive_accounts(ctx, request, first, second).await?;

    let (exchange, mut account_creation_fee) = construct_exchange(
        ctx,
        request.pools_pair,
        request.from_wallet_pubkey,
        Some(accounts.intermediary),
        Some(accounts.destination),
        request.amount,
    )
    .await?;

    // wrapped-SOL setup first and its cleanup last
    let mut instructions = Vec::new();
    let mut trailing_cleanup = Vec::new();
    let mut signers = vec![ctx.owner.clone()];
    if let Some(wrapped_sol) = accounts.wrapped_sol {
        if !wrapped_sol.instructions.is_empty() {
            account_creation_fee += ctx.min_rent_exemption;
        }
        instructions.extend(wrapped_sol.instructions);
        trailing_cleanup = wrapped_sol.cleanup_instructions;
        signers.extend(wrapped_sol.signers);
    }
    instructions.extend(exchange.instructions);
    instructions.extend(exchange.cleanup_instructions);
    instructions.extend(trailing_cleanup);
    signers.extend(exchange.signers);

    let swap = PreparedSwapTransaction {
        instructions,
        signers,
        account_creation_fee,
    };

    let new_wallet_pubkey = request.to_wallet_pubkey.is_none().then_some(accounts.destination);
    let transactions = match accounts.setup {
        Some(setup) => vec![setup, swap],
        None => vec![swap],
    };

    Ok(PreparedSwap {
        transactions,
        new_wallet_pubkey,
    })
}
