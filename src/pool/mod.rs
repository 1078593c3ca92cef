//! Pool model: static definition plus the reserve balances attached at
//! resolution time, the curve-dependent quoting formulas and the swap
//! instruction addressed to the pool.
//!
//! All amounts are integer atoms. A pool is always read in the direction
//! token A -> token B; callers flip it with [`Pool::reversed`] first.

pub mod instruction;
pub mod math;
pub mod resolver;

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use solana_instruction::Instruction;
use solana_pubkey::Pubkey;

use crate::{
    chain::{TokenAccountBalance, serde_pubkey},
    error::SwapError,
    pool::{
        instruction::SwapAccounts,
        math::{U256, apply_ratio},
    },
    swap_info::ProgramIds,
};

pub use resolver::PoolResolver;

/// Invariant curve of a pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveType {
    ConstantProduct,
    Stable,
    #[serde(other)]
    Unknown,
}

impl Display for CurveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from(*self))
    }
}

impl From<CurveType> for String {
    fn from(curve: CurveType) -> Self {
        match curve {
            CurveType::ConstantProduct => "ConstantProduct".to_string(),
            CurveType::Stable => "Stable".to_string(),
            CurveType::Unknown => "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    /// Token-swap state account.
    #[serde(with = "serde_pubkey")]
    pub account: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub authority: Pubkey,
    pub nonce: u64,
    #[serde(with = "serde_pubkey")]
    pub pool_token_mint: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub token_account_a: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub token_account_b: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub fee_account: Pubkey,
    #[serde(default, with = "serde_pubkey::option")]
    pub host_fee_account: Option<Pubkey>,
    pub fee_numerator: u64,
    pub fee_denominator: u64,
    pub owner_trade_fee_numerator: u64,
    pub owner_trade_fee_denominator: u64,
    pub owner_withdraw_fee_numerator: u64,
    pub owner_withdraw_fee_denominator: u64,
    pub host_fee_numerator: u64,
    pub host_fee_denominator: u64,
    pub token_a_name: String,
    pub token_b_name: String,
    pub curve_type: CurveType,
    #[serde(default)]
    pub amp: Option<u64>,
    #[serde(default)]
    pub program_version: Option<u64>,
    #[serde(default)]
    pub deprecated: Option<bool>,

    #[serde(skip)]
    pub token_a_balance: Option<TokenAccountBalance>,
    #[serde(skip)]
    pub token_b_balance: Option<TokenAccountBalance>,
    /// Set by the resolver when the pool path carries the stable marker.
    #[serde(skip)]
    pub is_stable: bool,
}

impl Pool {
    /// The same pool read in the B -> A direction.
    pub fn reversed(&self) -> Pool {
        let mut pool = self.clone();
        std::mem::swap(&mut pool.token_account_a, &mut pool.token_account_b);
        std::mem::swap(&mut pool.token_a_name, &mut pool.token_b_name);
        std::mem::swap(&mut pool.token_a_balance, &mut pool.token_b_balance);
        pool
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated == Some(true)
    }

    /// Effective curve; a stable path marker wins over the configured type.
    pub fn curve(&self) -> CurveType {
        if self.is_stable {
            CurveType::Stable
        } else {
            self.curve_type
        }
    }

    pub fn token_a_decimals(&self) -> Option<u8> {
        self.token_a_balance.map(|balance| balance.decimals)
    }

    pub fn token_b_decimals(&self) -> Option<u8> {
        self.token_b_balance.map(|balance| balance.decimals)
    }

    fn reserves(&self) -> Result<(u64, u64), SwapError> {
        match (self.token_a_balance, self.token_b_balance) {
            (Some(a), Some(b)) => Ok((a.amount, b.amount)),
            _ => Err(SwapError::AccountBalanceNotFound(self.account.into())),
        }
    }

    fn amp(&self) -> Result<u64, SwapError> {
        self.amp
            .ok_or(SwapError::AmpDoesNotExistInPoolConfig(self.account.into()))
    }

    /// Trading fee plus owner trade fee charged on `input_amount`.
    pub fn fee(&self, input_amount: u64) -> Result<u64, SwapError> {
        if self.curve() == CurveType::Unknown {
            return Err(SwapError::UnknownCurve(self.account.into()));
        }
        let trading_fee = math::compute_fee(input_amount, self.fee_numerator, self.fee_denominator);
        let owner_fee = math::compute_fee(
            input_amount,
            self.owner_trade_fee_numerator,
            self.owner_trade_fee_denominator,
        );
        Ok(trading_fee.saturating_add(owner_fee))
    }

    /// Curve output for an input that has already had fees taken out.
    fn output_less_fee(&self, input_amount: u64) -> Result<u64, SwapError> {
        let (pool_input, pool_output) = self.reserves()?;
        match self.curve() {
            CurveType::Stable => Ok(math::stable_output(input_amount, pool_input, pool_output, self.amp()?)),
            CurveType::ConstantProduct => Ok(math::constant_product_output(input_amount, pool_input, pool_output)),
            CurveType::Unknown => Err(SwapError::UnknownCurve(self.account.into())),
        }
    }

    pub fn output_amount(&self, input_amount: u64) -> Result<u64, SwapError> {
        let fee = self.fee(input_amount)?;
        self.output_less_fee(input_amount.saturating_sub(fee))
    }

    /// Input needed to receive `estimated_amount` of token B.
    pub fn input_amount(&self, estimated_amount: u64) -> Result<u64, SwapError> {
        let (pool_input, pool_output) = self.reserves()?;
        if estimated_amount > pool_output {
            return Err(SwapError::EstimatedAmountTooHigh(self.account.into()));
        }

        let fee_denominator = U256::from(self.fee_denominator);
        let fee_numerator = U256::from(self.fee_numerator);
        match self.curve() {
            CurveType::Stable => {
                let input_less_fee = math::stable_input(estimated_amount, pool_input, pool_output, self.amp()?);
                Ok(apply_ratio(
                    input_less_fee,
                    fee_denominator,
                    fee_denominator.saturating_sub(fee_numerator),
                ))
            }
            CurveType::ConstantProduct => {
                let input_less_fee = math::constant_product_input(estimated_amount, pool_input, pool_output);
                let (numerator, denominator) = if self.owner_trade_fee_denominator == 0 {
                    (fee_denominator, fee_denominator.saturating_sub(fee_numerator))
                } else {
                    let owner_denominator = U256::from(self.owner_trade_fee_denominator);
                    let owner_numerator = U256::from(self.owner_trade_fee_numerator);
                    let numerator = fee_denominator * owner_denominator;
                    let denominator = numerator
                        .saturating_sub(fee_numerator * owner_denominator)
                        .saturating_sub(owner_numerator * fee_denominator);
                    (numerator, denominator)
                };
                Ok(apply_ratio(input_less_fee, numerator, denominator))
            }
            CurveType::Unknown => Err(SwapError::UnknownCurve(self.account.into())),
        }
    }

    /// Output after slippage tolerance, floored.
    pub fn minimum_amount_out(&self, input_amount: u64, slippage: f64) -> Result<u64, SwapError> {
        let estimated = self.output_amount(input_amount)?;
        Ok((estimated as f64 * (1.0 - slippage)) as u64)
    }

    /// Input needed so that the slippage-adjusted output still reaches
    /// `minimum_receive_amount`. `None` when slippage is 100%.
    pub fn input_amount_for_minimum_out(
        &self,
        minimum_receive_amount: u64,
        slippage: f64,
    ) -> Result<Option<u64>, SwapError> {
        if slippage == 1.0 {
            return Ok(None);
        }
        let estimated = (minimum_receive_amount as f64 / (1.0 - slippage)) as u64;
        self.input_amount(estimated).map(Some)
    }

    /// Fee portion of `input_amount`, priced in token B.
    pub fn liquidity_provider_fee(&self, input_amount: u64) -> Result<u64, SwapError> {
        let fee = self.fee(input_amount)?;
        self.output_less_fee(fee)
    }

    /// Output with fees but without price movement.
    pub fn base_output_amount(&self, input_amount: u64) -> Result<u64, SwapError> {
        let (pool_input, pool_output) = self.reserves()?;
        let input_less_fee = input_amount.saturating_sub(self.fee(input_amount)?);
        match self.curve() {
            CurveType::Stable => Ok(math::stable_base_output(
                input_less_fee,
                pool_input,
                pool_output,
                self.amp()?,
            )),
            CurveType::ConstantProduct => Ok(math::constant_product_base_output(
                input_less_fee,
                pool_input,
                pool_output,
            )),
            CurveType::Unknown => Err(SwapError::UnknownCurve(self.account.into())),
        }
    }

    pub fn swap_program_id(&self, program_ids: &ProgramIds) -> Pubkey {
        program_ids.swap_program(self.program_version)
    }

    /// `Swap` from `source` (holding token A) into `destination` (token B).
    pub fn swap_instruction(
        &self,
        program_ids: &ProgramIds,
        user_transfer_authority: Pubkey,
        source: Pubkey,
        destination: Pubkey,
        amount_in: u64,
        minimum_amount_out: u64,
    ) -> Result<Instruction, SwapError> {
        let accounts = SwapAccounts {
            token_swap: self.account,
            authority: self.authority,
            user_transfer_authority,
            user_source: source,
            pool_source: self.token_account_a,
            pool_destination: self.token_account_b,
            user_destination: destination,
            pool_mint: self.pool_token_mint,
            fee_account: self.fee_account,
            token_program: program_ids.token,
            host_fee_account: self.host_fee_account,
        };
        instruction::swap(self.swap_program_id(program_ids), &accounts, amount_in, minimum_amount_out)
    }
}
