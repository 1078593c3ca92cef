pub mod balance_cache;

use solana_pubkey::Pubkey;
use thiserror::Error;

use crate::chain::TokenAccountBalance;

/// Trait that abstracts the token-account balance memo shared by pool
/// resolutions.
///
/// Implementers must satisfy the following:
///
/// - **Thread-safety:** Trait objects must be `Send + Sync`.
/// - **Deterministic ordering:** `get_balances()` returns entries in the same
///   order as the input addresses.
/// - **Atomic batches:** every entry of one `save()` call becomes visible
///   together, so the two reserve balances of a pool are never torn.
/// - **No expiry:** entries live until overwritten by a later `save()`.
pub trait BalancesCache: Send + Sync {
    /// Last known balance of a single token account.
    fn get_balance(&self, account: &Pubkey) -> Result<Option<TokenAccountBalance>, BalanceCacheError>;

    /// Last known balances of several accounts, `None` for unknown ones.
    fn get_balances(
        &self,
        accounts: &[Pubkey],
    ) -> Result<Vec<Option<TokenAccountBalance>>, BalanceCacheError> {
        accounts.iter().map(|account| self.get_balance(account)).collect()
    }

    /// Store a batch of balances, overwriting older entries.
    fn save(&self, balances: &[(Pubkey, TokenAccountBalance)]) -> Result<(), BalanceCacheError>;
}

/// Errors from the balance cache layer.
#[derive(Debug, Error)]
pub enum BalanceCacheError {
    /// The write lock was poisoned by a panicking writer.
    #[error("Failed to acquire write lock")]
    FailedToAcquireWriteLock,

    /// The read lock was poisoned by a panicking writer.
    #[error("Failed to acquire read lock")]
    FailedToAcquireReadLock,
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BalanceCacheError>();
};
