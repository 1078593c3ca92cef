//! A route resolved into oriented pools.
//!
//! `PoolsPair` is either a direct swap through one pool or a transitive swap
//! through two pools sharing an intermediary token. The first pool's token A
//! is always the source token and the last pool's token B the destination.

pub mod ranker;

use crate::{
    error::{ErrorInfo, SwapError},
    pool::Pool,
};

pub use ranker::{best_for_estimated_amount, best_for_input_amount};

#[derive(Debug, Clone, PartialEq)]
pub enum PoolsPair {
    Direct(Pool),
    Transitive(Pool, Pool),
}

impl TryFrom<Vec<Pool>> for PoolsPair {
    type Error = SwapError;

    fn try_from(pools: Vec<Pool>) -> Result<Self, Self::Error> {
        let count = pools.len();
        let mut pools = pools.into_iter();
        match (pools.next(), pools.next(), pools.next()) {
            (Some(pool), None, None) => Ok(PoolsPair::Direct(pool)),
            (Some(first), Some(second), None) => Ok(PoolsPair::Transitive(first, second)),
            _ => Err(SwapError::InvalidPool(ErrorInfo::String(format!(
                "a pools pair holds one or two pools, got {count}"
            )))),
        }
    }
}

/// What the first leg of a transitive swap yields.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediaryToken {
    pub token_name: String,
    pub output_amount: Option<u64>,
    pub minimum_amount_out: Option<u64>,
    /// Whether the second leg runs through a stable pool.
    pub is_stable_swap: bool,
}

impl PoolsPair {
    pub fn first(&self) -> &Pool {
        match self {
            PoolsPair::Direct(pool) | PoolsPair::Transitive(pool, _) => pool,
        }
    }

    pub fn last(&self) -> &Pool {
        match self {
            PoolsPair::Direct(pool) | PoolsPair::Transitive(_, pool) => pool,
        }
    }

    pub fn pools(&self) -> Vec<&Pool> {
        match self {
            PoolsPair::Direct(pool) => vec![pool],
            PoolsPair::Transitive(first, second) => vec![first, second],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PoolsPair::Direct(_) => 1,
            PoolsPair::Transitive(..) => 2,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, PoolsPair::Direct(_))
    }

    pub fn output_amount(&self, input_amount: u64) -> Result<u64, SwapError> {
        match self {
            PoolsPair::Direct(pool) => pool.output_amount(input_amount),
            PoolsPair::Transitive(first, second) => second.output_amount(first.output_amount(input_amount)?),
        }
    }

    /// Input needed to receive `estimated_amount` of the destination token.
    pub fn input_amount(&self, estimated_amount: u64) -> Result<u64, SwapError> {
        match self {
            PoolsPair::Direct(pool) => pool.input_amount(estimated_amount),
            PoolsPair::Transitive(first, second) => first.input_amount(second.input_amount(estimated_amount)?),
        }
    }

    pub fn input_amount_for_minimum_out(
        &self,
        minimum_amount_out: u64,
        slippage: f64,
    ) -> Result<Option<u64>, SwapError> {
        match self {
            PoolsPair::Direct(pool) => pool.input_amount_for_minimum_out(minimum_amount_out, slippage),
            PoolsPair::Transitive(first, second) => {
                match second.input_amount_for_minimum_out(minimum_amount_out, slippage)? {
                    Some(intermediary_amount) => first.input_amount_for_minimum_out(intermediary_amount, slippage),
                    None => Ok(None),
                }
            }
        }
    }

    /// Slippage is applied once, on the last leg.
    pub fn minimum_amount_out(&self, input_amount: u64, slippage: f64) -> Result<u64, SwapError> {
        match self {
            PoolsPair::Direct(pool) => pool.minimum_amount_out(input_amount, slippage),
            PoolsPair::Transitive(first, second) => {
                second.minimum_amount_out(first.output_amount(input_amount)?, slippage)
            }
        }
    }

    pub fn intermediary_token(&self, input_amount: u64, slippage: f64) -> Option<IntermediaryToken> {
        match self {
            PoolsPair::Direct(_) => None,
            PoolsPair::Transitive(first, second) => Some(IntermediaryToken {
                token_name: first.token_b_name.clone(),
                output_amount: first.output_amount(input_amount).ok(),
                minimum_amount_out: first.minimum_amount_out(input_amount, slippage).ok(),
                is_stable_swap: second.is_stable,
            }),
        }
    }

    /// Liquidity-provider fee of every leg, each in that leg's output token.
    /// The second leg is priced at the first leg's minimum output.
    pub fn liquidity_provider_fees(&self, input_amount: u64, slippage: f64) -> Result<Vec<u64>, SwapError> {
        if self.first().token_a_balance.is_none() {
            return Err(SwapError::InvalidPool(self.first().account.into()));
        }
        match self {
            PoolsPair::Direct(pool) => Ok(vec![pool.liquidity_provider_fee(input_amount)?]),
            PoolsPair::Transitive(first, second) => {
                let mut fees = vec![first.liquidity_provider_fee(input_amount)?];
                if let Ok(intermediary_amount) = first.minimum_amount_out(input_amount, slippage) {
                    fees.push(second.liquidity_provider_fee(intermediary_amount)?);
                }
                Ok(fees)
            }
        }
    }

    /// Output with fees but without price movement.
    pub fn base_output_amount(&self, input_amount: u64) -> Result<u64, SwapError> {
        match self {
            PoolsPair::Direct(pool) => pool.base_output_amount(input_amount),
            PoolsPair::Transitive(first, second) => {
                second.base_output_amount(first.base_output_amount(input_amount)?)
            }
        }
    }

    /// Price impact in percent: how far `output_amount` falls short of the
    /// spot-price output for `input_amount`.
    pub fn price_impact(&self, input_amount: u64, output_amount: u64) -> Option<f64> {
        let base_output = self.base_output_amount(input_amount).ok()?;
        if base_output == 0 {
            return None;
        }
        Some((base_output as f64 - output_amount as f64) / base_output as f64 * 100.0)
    }
}
