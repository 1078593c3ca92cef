//! Collaborators the engine consumes but does not own.
//!
//! - [`SolanaRpc`]: balances, account existence, rent, blockhash and
//!   transaction submission. Implemented for the nonblocking `RpcClient` in
//!   [`rpc_client`]; tests substitute an in-memory double.
//! - [`SwapDataSource`]: the static token/pool/program-id universe, read once
//!   per `load()`. [`json_source::JsonSwapDataSource`] parses the usual JSON
//!   configuration document.
//! - [`AccountStorage`]: the owner's signing identity.

pub mod json_source;
pub mod serde_pubkey;
pub mod rpc_client;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_transaction::Transaction;
use thiserror::Error;

use crate::{
    error::SwapError,
    pool::Pool,
    swap_info::{ProgramIds, TokenValue},
};

/// Balance of an SPL token account in atoms, with its mint decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccountBalance {
    pub amount: u64,
    pub decimals: u8,
}

impl TokenAccountBalance {
    pub fn new(amount: u64, decimals: u8) -> Self {
        Self { amount, decimals }
    }
}

/// Errors from the RPC layer.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The cluster rejected or failed the transaction. `logs` carries the
    /// program logs when the node returned them.
    #[error("Transaction failed: {message}")]
    TransactionError { message: String, logs: Vec<String> },

    #[error("Transaction {0} was not confirmed in time")]
    ConfirmationTimeout(Signature),

    /// The node answered with something that could not be interpreted.
    #[error("Invalid rpc response: {0}")]
    InvalidResponse(String),

    #[error("Rpc client error: {0}")]
    ClientError(#[from] solana_client::client_error::ClientError),
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RpcError>();
};

/// Account and transaction RPC surface used by the engine.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    async fn get_token_account_balance(&self, account: &Pubkey) -> Result<TokenAccountBalance, RpcError>;

    /// Whether the associated token account of `owner` for `mint` exists.
    async fn associated_token_account_exists(&self, owner: &Pubkey, mint: &Pubkey) -> Result<bool, RpcError>;

    async fn get_minimum_balance_for_rent_exemption(&self, span: usize) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError>;

    /// Simulate without submitting. A failed simulation is reported as
    /// `RpcError::TransactionError` carrying the simulation logs.
    async fn simulate_transaction(&self, transaction: &Transaction) -> Result<(), RpcError>;

    /// Resolve once `signature` is confirmed, or fail with
    /// `RpcError::ConfirmationTimeout` after `timeout`.
    async fn wait_for_confirmation(&self, signature: &Signature, timeout: Duration) -> Result<(), RpcError>;
}

/// Bulk static data, read once per `load()`.
#[async_trait]
pub trait SwapDataSource: Send + Sync {
    async fn get_tokens(&self) -> Result<BTreeMap<String, TokenValue>, SwapError>;

    async fn get_pools(&self) -> Result<BTreeMap<String, Pool>, SwapError>;

    async fn get_program_ids(&self) -> Result<ProgramIds, SwapError>;
}

/// Supplies the owner's signing identity, if any.
pub trait AccountStorage: Send + Sync {
    fn account(&self) -> Option<Arc<Keypair>>;
}

impl AccountStorage for Option<Arc<Keypair>> {
    fn account(&self) -> Option<Arc<Keypair>> {
        self.clone()
    }
}
