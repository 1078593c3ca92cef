//! `SolanaRpc` backed by the nonblocking Solana `RpcClient`.
//!
//! Preflight and simulation failures are unpacked into
//! `RpcError::TransactionError` so that the program logs reach the executor's
//! retry predicate.

use std::time::Duration;

use async_trait::async_trait;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_request::{RpcError as ClientRpcError, RpcResponseErrorData},
};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use solana_transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;

use crate::chain::{RpcError, SolanaRpc, TokenAccountBalance};

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Program logs of a failed preflight simulation, if the error is one.
pub fn preflight_logs(error: &ClientError) -> Option<(&str, &[String])> {
    match error.kind() {
        ClientErrorKind::RpcError(ClientRpcError::RpcResponseError {
            message,
            data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
            ..
        }) => Some((message.as_str(), result.logs.as_deref().unwrap_or_default())),
        _ => None,
    }
}

/// Turn a preflight failure into a `TransactionError` carrying its logs.
fn into_rpc_error(error: ClientError) -> RpcError {
    if let Some((message, logs)) = preflight_logs(&error) {
        return RpcError::TransactionError {
            message: message.to_string(),
            logs: logs.to_vec(),
        };
    }
    RpcError::ClientError(error)
}

#[async_trait]
impl SolanaRpc for RpcClient {
    async fn get_token_account_balance(&self, account: &Pubkey) -> Result<TokenAccountBalance, RpcError> {
        let ui_amount = RpcClient::get_token_account_balance(self, account).await?;
        let amount = ui_amount
            .amount
            .parse::<u64>()
            .map_err(|e| RpcError::InvalidResponse(format!("token amount of {account}: {e}")))?;
        Ok(TokenAccountBalance::new(amount, ui_amount.decimals))
    }

    async fn associated_token_account_exists(&self, owner: &Pubkey, mint: &Pubkey) -> Result<bool, RpcError> {
        let address = get_associated_token_address(owner, mint);
        let account = self
            .get_account_with_commitment(&address, self.commitment())
            .await?
            .value;
        Ok(account.is_some_and(|account| account.owner == spl_token::ID))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, span: usize) -> Result<u64, RpcError> {
        Ok(RpcClient::get_minimum_balance_for_rent_exemption(self, span).await?)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(RpcClient::get_latest_blockhash(self).await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        RpcClient::send_transaction(self, transaction)
            .await
            .map_err(into_rpc_error)
    }

    async fn simulate_transaction(&self, transaction: &Transaction) -> Result<(), RpcError> {
        let result = RpcClient::simulate_transaction(self, transaction)
            .await
            .map_err(into_rpc_error)?
            .value;
        match result.err {
            Some(err) => Err(RpcError::TransactionError {
                message: format!("{err:?}"),
                logs: result.logs.unwrap_or_default(),
            }),
            None => Ok(()),
        }
    }

    async fn wait_for_confirmation(&self, signature: &Signature, timeout: Duration) -> Result<(), RpcError> {
        let poll = async {
            loop {
                let confirmed = self
                    .confirm_transaction_with_commitment(signature, CommitmentConfig::confirmed())
                    .await?
                    .value;
                if confirmed {
                    return Ok::<(), RpcError>(());
                }
                tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| RpcError::ConfirmationTimeout(*signature))?
    }
}
