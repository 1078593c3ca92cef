//! Signs, submits and, for split swaps, sequences prepared transactions.

pub mod retry;

use std::sync::Arc;

use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_transaction::Transaction;

use crate::{
    chain::{RpcError, SolanaRpc, rpc_client::preflight_logs},
    config::SwapConfig,
    error::SwapError,
    executor::retry::{RetryError, retrying},
    transaction::PreparedSwapTransaction,
};

/// Log line of the token program when the intermediary account of a split
/// swap is not visible to the swap transaction yet.
pub const INVALID_ACCOUNT_DATA_LOG: &str = "Program log: Error: InvalidAccountData";

/// The only error the second transaction of a split swap is retried on.
pub fn is_invalid_account_data(error: &SwapError) -> bool {
    let contains = |logs: &[String]| logs.iter().any(|line| line.contains(INVALID_ACCOUNT_DATA_LOG));
    match error {
        SwapError::Rpc(RpcError::TransactionError { logs, .. }) => contains(logs.as_slice()),
        SwapError::Rpc(RpcError::ClientError(error)) => {
            preflight_logs(error).is_some_and(|(_, logs)| contains(logs))
        }
        _ => false,
    }
}

pub struct SwapExecutor<'a> {
    rpc: &'a dyn SolanaRpc,
    owner: &'a Arc<Keypair>,
    config: &'a SwapConfig,
}

impl<'a> SwapExecutor<'a> {
    pub fn new(rpc: &'a dyn SolanaRpc, owner: &'a Arc<Keypair>, config: &'a SwapConfig) -> Self {
        Self { rpc, owner, config }
    }

    fn sign_transaction(
        &self,
        prepared: &PreparedSwapTransaction,
        blockhash: solana_hash::Hash,
    ) -> Result<Transaction, SwapError> {
        let mut transaction = Transaction::new_with_payer(&prepared.instructions, Some(&self.owner.pubkey()));
        let signers: Vec<&Keypair> = prepared.signers.iter().map(Arc::as_ref).collect();
        transaction.try_sign(&signers, blockhash)?;
        Ok(transaction)
    }

    /// Sign with a fresh blockhash and send, or only simulate. Simulation
    /// yields no signature.
    pub async fn prepare_and_send(
        &self,
        prepared: &PreparedSwapTransaction,
        is_simulation: bool,
    ) -> Result<Option<Signature>, SwapError> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let transaction = self.sign_transaction(prepared, blockhash)?;
        if is_simulation {
            self.rpc.simulate_transaction(&transaction).await?;
            log::info!("swap transaction simulated successfully");
            return Ok(None);
        }
        let signature = self.rpc.send_transaction(&transaction).await?;
        log::info!("sent transaction {signature}");
        Ok(Some(signature))
    }

    /// Run one or two prepared transactions and return the id of the last.
    ///
    /// The setup transaction of a split swap is always sent for real. The
    /// swap transaction follows once the setup is confirmed, or the
    /// confirmation wait gives up, and is retried while the intermediary
    /// account still reads as invalid.
    pub async fn execute(
        &self,
        transactions: &[PreparedSwapTransaction],
        is_simulation: bool,
    ) -> Result<Option<Signature>, SwapError> {
        match transactions {
            [swap] => self.prepare_and_send(swap, is_simulation).await,
            [setup, swap] => {
                if let Some(signature) = self.prepare_and_send(setup, false).await? {
                    match self
                        .rpc
                        .wait_for_confirmation(&signature, self.config.confirmation_timeout)
                        .await
                    {
                        Ok(()) => log::debug!("setup transaction {signature} confirmed"),
                        Err(RpcError::ConfirmationTimeout(signature)) => {
                            log::warn!("setup transaction {signature} not confirmed in time, sending swap anyway")
                        }
                        Err(error) => return Err(error.into()),
                    }
                }

                retrying(&self.config.retry, is_invalid_account_data, move || {
                    self.prepare_and_send(swap, is_simulation)
                })
                .await
                .map_err(|error| match error {
                    RetryError::TimedOut(elapsed) => SwapError::Timeout(elapsed),
                    RetryError::Failed(error) => error,
                })
            }
            _ => Err(SwapError::InvalidNumberOfTransactions(transactions.len())),
        }
    }
}
