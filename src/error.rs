//! Error types for the swap engine.
//!
//! `SwapError` is the single error surfaced by every public entry point. Lower
//! layers (the RPC adapter, the balance cache) keep their own error enums and
//! are folded in through `#[from]`.
//!
//! `ErrorInfo` attaches light context (a pubkey, a token name, a route key)
//! to the variants that need to say *what* was missing.

use std::{fmt::Display, time::Duration};

use solana_pubkey::Pubkey;
use solana_sdk::signer::SignerError;
use thiserror::Error;

use crate::{account_caching::BalanceCacheError, chain::RpcError};

/// Wrapper type for attaching additional context to an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorInfo {
    Pubkey(Pubkey),
    String(String),
    StaticStr(&'static str),
}

impl From<Pubkey> for ErrorInfo {
    fn from(pubkey: Pubkey) -> Self {
        ErrorInfo::Pubkey(pubkey)
    }
}

impl From<&Pubkey> for ErrorInfo {
    fn from(pubkey: &Pubkey) -> Self {
        ErrorInfo::Pubkey(*pubkey)
    }
}

impl From<String> for ErrorInfo {
    fn from(string: String) -> Self {
        ErrorInfo::String(string)
    }
}

impl From<&String> for ErrorInfo {
    fn from(string: &String) -> Self {
        ErrorInfo::String(string.clone())
    }
}

impl From<&'static str> for ErrorInfo {
    fn from(string: &'static str) -> Self {
        ErrorInfo::StaticStr(string)
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorInfo::Pubkey(pubkey) => write!(f, "{}", pubkey),
            ErrorInfo::String(string) => write!(f, "{}", string),
            ErrorInfo::StaticStr(string) => write!(f, "{}", string),
        }
    }
}

/// Errors returned by route lookup, quoting, fee estimation, transaction
/// preparation and swap execution.
///
/// **Caller-recoverable**
/// - `NotFound`
/// - `SwapInfoMissing`
/// - `Unauthorized`
///
/// **Pool data issues**
/// - `InvalidPool`
/// - `AccountBalanceNotFound`
/// - `EstimatedAmountTooHigh`
/// - `AmpDoesNotExistInPoolConfig`
/// - `UnknownCurve`
/// - `CouldNotEstimateMinimumOutAmount`
///
/// **Invariant violations**
/// - `InvalidNumberOfTransactions`
/// - `IntermediaryTokenAddressNotFound`
///
/// **Infrastructure**
/// - `Rpc`, `BalanceCache` (converted via `#[from]`)
/// - `CacheUnlockFailed`, `InstructionBuild`, `Signing`, `DataSource`, `Timeout`
#[derive(Error, Debug)]
pub enum SwapError {
    /// Unknown token, mint, pool or route.
    #[error("Not found: {0}")]
    NotFound(ErrorInfo),

    /// An operation needed the snapshot before `load()` completed.
    #[error("Swap info is missing, call load() first")]
    SwapInfoMissing,

    /// No signing identity is available.
    #[error("Unauthorized: no owner account")]
    Unauthorized,

    /// A pools-pair lacks balances or decimals it should have been resolved with.
    #[error("Invalid pool: {0}")]
    InvalidPool(ErrorInfo),

    /// Preparation produced a number of transactions other than 1 or 2.
    #[error("Invalid number of transactions: {0}")]
    InvalidNumberOfTransactions(usize),

    /// A pool's reserve balances were not loaded.
    #[error("Account balance not found for pool {0}")]
    AccountBalanceNotFound(ErrorInfo),

    /// The requested output exceeds the pool's output reserve.
    #[error("Estimated amount is too high for pool {0}")]
    EstimatedAmountTooHigh(ErrorInfo),

    /// A stable pool has no amplification coefficient.
    #[error("Amp does not exist in pool config: {0}")]
    AmpDoesNotExistInPoolConfig(ErrorInfo),

    #[error("Unknown curve type for pool {0}")]
    UnknownCurve(ErrorInfo),

    #[error("Could not estimate minimum output amount: {0}")]
    CouldNotEstimateMinimumOutAmount(ErrorInfo),

    /// A transitive exchange was built without an intermediary account.
    #[error("Intermediary token address not found")]
    IntermediaryTokenAddressNotFound,

    #[error("Failed to build instruction: {0}")]
    InstructionBuild(ErrorInfo),

    #[error("Failed to sign transaction: {0}")]
    Signing(#[from] SignerError),

    /// Static token/pool data could not be loaded or parsed.
    #[error("Data source error: {0}")]
    DataSource(ErrorInfo),

    /// Failed to obtain the snapshot lock.
    #[error("Failed to unlock swap info")]
    CacheUnlockFailed,

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rpc error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Balance cache error: {0}")]
    BalanceCache(#[from] BalanceCacheError),
}

impl From<solana_program::program_error::ProgramError> for SwapError {
    fn from(error: solana_program::program_error::ProgramError) -> Self {
        SwapError::InstructionBuild(ErrorInfo::String(error.to_string()))
    }
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SwapError>();
};
