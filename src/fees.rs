//! Network fee estimation for a candidate swap.
//!
//! The estimate is itemised: signature lamports, refundable deposits for
//! temporary wrapped-SOL accounts, and rent kept in newly created token
//! accounts. Liquidity-provider fees are a separate figure, see
//! [`PoolsPair::liquidity_provider_fees`].

use std::ops::Add;

use solana_pubkey::Pubkey;

use crate::{
    chain::SolanaRpc,
    error::SwapError,
    pools_pair::PoolsPair,
    swap_info::SwapInfo,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeeAmount {
    /// Signature fees.
    pub transaction: u64,
    /// Rent for wrapped-SOL accounts, returned when they are closed.
    pub deposit: u64,
    /// Rent locked in newly created token accounts.
    pub account_balances: u64,
}

impl FeeAmount {
    pub fn total(&self) -> u64 {
        self.transaction + self.deposit + self.account_balances
    }
}

impl Add for FeeAmount {
    type Output = FeeAmount;

    fn add(self, other: FeeAmount) -> FeeAmount {
        FeeAmount {
            transaction: self.transaction + other.transaction,
            deposit: self.deposit + other.deposit,
            account_balances: self.account_balances + other.account_balances,
        }
    }
}

/// Inputs of a network fee estimate.
#[derive(Debug, Clone)]
pub struct NetworkFeeContext<'a> {
    /// Mints the owner already holds token accounts for.
    pub my_wallets_mints: &'a [Pubkey],
    /// Source account; the owner's address means native SOL.
    pub from_wallet_pubkey: Pubkey,
    /// Destination account, `None` when it has to be created.
    pub to_wallet_pubkey: Option<Pubkey>,
    pub pools_pair: Option<&'a PoolsPair>,
    pub lamports_per_signature: u64,
    pub min_rent_exemption: u64,
}

pub async fn estimate_network_fees(
    rpc: &dyn SolanaRpc,
    info: &SwapInfo,
    owner: &Pubkey,
    context: &NetworkFeeContext<'_>,
) -> Result<FeeAmount, SwapError> {
    let lamports_per_signature = context.lamports_per_signature;
    let min_rent_exemption = context.min_rent_exemption;

    let intermediary_mint = match context.pools_pair {
        Some(PoolsPair::Transitive(first, _)) => Some(info.mint_or_err(&first.token_b_name)?),
        _ => None,
    };

    let mut number_of_transactions = 1;
    if let Some(intermediary_mint) = intermediary_mint {
        if !context.my_wallets_mints.contains(&intermediary_mint) || context.to_wallet_pubkey.is_none() {
            number_of_transactions += 1;
        }
    }

    let mut fee = FeeAmount {
        transaction: number_of_transactions * lamports_per_signature,
        ..FeeAmount::default()
    };

    // temporary wrapped-SOL source account
    if context.from_wallet_pubkey == *owner {
        fee.transaction += lamports_per_signature;
        fee.deposit += min_rent_exemption;
    }

    let mut is_intermediary_created = true;
    if let Some(intermediary_mint) = intermediary_mint {
        if intermediary_mint == spl_token::native_mint::ID {
            fee.transaction += lamports_per_signature;
            fee.deposit += min_rent_exemption;
        } else {
            is_intermediary_created = rpc
                .associated_token_account_exists(owner, &intermediary_mint)
                .await?;
        }
    }

    match context.to_wallet_pubkey {
        None => fee.account_balances += min_rent_exemption,
        Some(to_wallet) if to_wallet == *owner => {
            fee.transaction += lamports_per_signature;
            fee.deposit += min_rent_exemption;
        }
        Some(_) => {}
    }

    if !is_intermediary_created {
        fee.account_balances += min_rent_exemption;
    }

    log::debug!(
        "network fees: {} transaction(s), {:?}",
        number_of_transactions,
        fee
    );
    Ok(fee)
}
