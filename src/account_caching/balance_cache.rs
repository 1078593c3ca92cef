//! In-memory balance cache shared by concurrent pool resolutions.
//!
//! Balances live in a `DashMap`. A reader-writer lock around it makes every
//! `save()` batch land as a unit: writers hold it exclusively for the whole
//! batch, readers share it for the whole lookup, so the pair of balances
//! saved after a pool fetch is never observed half-written.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use solana_pubkey::Pubkey;

use crate::{
    account_caching::{BalanceCacheError, BalancesCache},
    chain::TokenAccountBalance,
};

type BalanceMap = DashMap<Pubkey, TokenAccountBalance>;

#[derive(Default)]
pub struct InMemoryBalancesCache {
    balances: BalanceMap,
    batch_lock: RwLock<()>,
}

impl InMemoryBalancesCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_batch(&self) -> Result<RwLockReadGuard<'_, ()>, BalanceCacheError> {
        self.batch_lock
            .read()
            .map_err(|_| BalanceCacheError::FailedToAcquireReadLock)
    }

    fn write_batch(&self) -> Result<RwLockWriteGuard<'_, ()>, BalanceCacheError> {
        self.batch_lock
            .write()
            .map_err(|_| BalanceCacheError::FailedToAcquireWriteLock)
    }

    /// Drop every cached balance.
    pub fn reset_cache(&self) -> Result<(), BalanceCacheError> {
        let _guard = self.write_batch()?;
        self.balances.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl BalancesCache for InMemoryBalancesCache {
    fn get_balance(&self, account: &Pubkey) -> Result<Option<TokenAccountBalance>, BalanceCacheError> {
        let _guard = self.read_batch()?;
        Ok(self.balances.get(account).map(|entry| *entry.value()))
    }

    fn get_balances(&self, accounts: &[Pubkey]) -> Result<Vec<Option<TokenAccountBalance>>, BalanceCacheError> {
        let _guard = self.read_batch()?;
        Ok(accounts
            .iter()
            .map(|account| self.balances.get(account).map(|entry| *entry.value()))
            .collect())
    }

    fn save(&self, balances: &[(Pubkey, TokenAccountBalance)]) -> Result<(), BalanceCacheError> {
        let _guard = self.write_batch()?;
        for (account, balance) in balances {
            log::trace!("caching balance {} for {}", balance.amount, account);
            self.balances.insert(*account, *balance);
        }
        Ok(())
    }
}
