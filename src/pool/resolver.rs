//! Turns pool path identifiers into pools carrying live reserve balances.
//!
//! Balances come from the shared [`BalancesCache`] when both reserve accounts
//! of a pool are known; otherwise both are fetched concurrently and written
//! back as one batch.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::{
    account_caching::BalancesCache,
    chain::SolanaRpc,
    error::SwapError,
    pool::Pool,
    pools_pair::PoolsPair,
    swap_info::{Route, SwapInfo},
};

/// Path marker selecting the stable variant of a pool definition.
pub const STABLE_MARKER: &str = "[stable]";

#[derive(Clone)]
pub struct PoolResolver {
    rpc: Arc<dyn SolanaRpc>,
    cache: Arc<dyn BalancesCache>,
}

impl PoolResolver {
    pub fn new(rpc: Arc<dyn SolanaRpc>, cache: Arc<dyn BalancesCache>) -> Self {
        Self { rpc, cache }
    }

    /// Resolve one pool. `Ok(None)` when the id is not in the snapshot.
    pub async fn resolve(&self, info: &SwapInfo, pool_id: &str) -> Result<Option<Pool>, SwapError> {
        let Some(pool) = info.pools.get(pool_id) else {
            return Ok(None);
        };
        let mut pool = pool.clone();
        if pool_id.contains(STABLE_MARKER) {
            pool.is_stable = true;
        }

        let accounts = [pool.token_account_a, pool.token_account_b];
        let (balance_a, balance_b) = match self.cache.get_balances(&accounts)?.as_slice() {
            [Some(balance_a), Some(balance_b)] => {
                log::trace!("balances of {pool_id} served from cache");
                (*balance_a, *balance_b)
            }
            _ => {
                let (balance_a, balance_b) = tokio::try_join!(
                    self.rpc.get_token_account_balance(&accounts[0]),
                    self.rpc.get_token_account_balance(&accounts[1]),
                )?;
                self.cache
                    .save(&[(accounts[0], balance_a), (accounts[1], balance_b)])?;
                (balance_a, balance_b)
            }
        };

        pool.token_a_balance = Some(balance_a);
        pool.token_b_balance = Some(balance_b);
        Ok(Some(pool))
    }

    /// Resolve every pool of `route` concurrently and orient the result from
    /// `from_token` to `to_token`. `Ok(None)` when any pool is unknown.
    pub async fn pools_for_route(
        &self,
        info: &SwapInfo,
        route: &Route,
        from_token: &str,
        to_token: &str,
    ) -> Result<Option<PoolsPair>, SwapError> {
        let resolved = try_join_all(route.pool_ids().into_iter().map(|id| self.resolve(info, id))).await?;
        let Some(mut pools) = resolved.into_iter().collect::<Option<Vec<Pool>>>() else {
            return Ok(None);
        };
        orient_pools(&mut pools, from_token, to_token);
        PoolsPair::try_from(pools).map(Some)
    }
}

/// Put a resolved path in swap order.
///
/// Two-pool paths whose first pool does not touch `from_token` are swapped.
/// Then the first pool is flipped unless its token A is `from_token`, and the
/// last pool unless its token B is `to_token`.
pub fn orient_pools(pools: &mut [Pool], from_token: &str, to_token: &str) {
    if pools.len() == 2 && pools[0].token_a_name != from_token && pools[0].token_b_name != from_token {
        pools.swap(0, 1);
    }
    if let Some(first) = pools.first_mut() {
        if first.token_a_name != from_token {
            *first = first.reversed();
        }
    }
    if let Some(last) = pools.last_mut() {
        if last.token_b_name != to_token {
            *last = last.reversed();
        }
    }
}
