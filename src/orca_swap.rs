//! The swap engine: loads the snapshot once and exposes route lookup,
//! quoting, fee estimation, preparation and execution on top of it.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use solana_pubkey::Pubkey;
use solana_sdk::{
    signature::{Keypair, Signature},
    signer::Signer,
};

use crate::{
    account_caching::BalancesCache,
    chain::{AccountStorage, SolanaRpc, SwapDataSource},
    config::SwapConfig,
    error::SwapError,
    executor::SwapExecutor,
    fees::{FeeAmount, NetworkFeeContext, estimate_network_fees},
    pool::PoolResolver,
    pools_pair::{PoolsPair, ranker},
    swap_info::{Routes, SwapInfo},
    transaction::{PreparedSwap, SwapRequest, prepare_for_swapping},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResponse {
    /// Id of the terminal transaction; `None` when it was only simulated.
    pub transaction_id: Option<Signature>,
    pub new_wallet_pubkey: Option<Pubkey>,
}

pub struct OrcaSwap {
    data_source: Arc<dyn SwapDataSource>,
    rpc: Arc<dyn SolanaRpc>,
    account_storage: Arc<dyn AccountStorage>,
    resolver: PoolResolver,
    config: SwapConfig,
    info: RwLock<Option<Arc<SwapInfo>>>,
}

impl OrcaSwap {
    pub fn new(
        data_source: Arc<dyn SwapDataSource>,
        rpc: Arc<dyn SolanaRpc>,
        account_storage: Arc<dyn AccountStorage>,
        balances_cache: Arc<dyn BalancesCache>,
        config: SwapConfig,
    ) -> Self {
        Self {
            data_source,
            resolver: PoolResolver::new(rpc.clone(), balances_cache),
            rpc,
            account_storage,
            config,
            info: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    /// Build the snapshot. A no-op once a snapshot exists.
    pub async fn load(&self) -> Result<(), SwapError> {
        if self.info.read().map_err(|_| SwapError::CacheUnlockFailed)?.is_some() {
            return Ok(());
        }

        let (tokens, pools, program_ids) = tokio::try_join!(
            self.data_source.get_tokens(),
            self.data_source.get_pools(),
            self.data_source.get_program_ids(),
        )?;
        let info = SwapInfo::new(tokens, pools, program_ids);
        log::info!(
            "loaded swap info: {} tokens, {} pools, {} routes",
            info.tokens.len(),
            info.pools.len(),
            info.routes.values().map(Vec::len).sum::<usize>()
        );

        let mut guard = self.info.write().map_err(|_| SwapError::CacheUnlockFailed)?;
        // a concurrent load may have won the race
        if guard.is_none() {
            *guard = Some(Arc::new(info));
        }
        Ok(())
    }

    /// Current snapshot.
    pub fn swap_info(&self) -> Result<Arc<SwapInfo>, SwapError> {
        self.info
            .read()
            .map_err(|_| SwapError::CacheUnlockFailed)?
            .clone()
            .ok_or(SwapError::SwapInfoMissing)
    }

    fn owner(&self) -> Result<Arc<Keypair>, SwapError> {
        self.account_storage.account().ok_or(SwapError::Unauthorized)
    }

    pub fn get_mint(&self, token_name: &str) -> Result<Option<Pubkey>, SwapError> {
        Ok(self.swap_info()?.mint(token_name))
    }

    pub fn find_routes(&self, from_token_name: Option<&str>, to_token_name: Option<&str>) -> Result<Routes, SwapError> {
        Ok(self.swap_info()?.find_routes(from_token_name, to_token_name))
    }

    /// Mints reachable from `from_mint` through at least one route.
    pub fn find_possible_destination_mints(&self, from_mint: &Pubkey) -> Result<Vec<Pubkey>, SwapError> {
        let info = self.swap_info()?;
        let from_name = info
            .token_name(from_mint)
            .ok_or_else(|| SwapError::NotFound(from_mint.into()))?;

        let mut mints = Vec::new();
        for key in info.find_routes(Some(from_name), None).keys() {
            let Some(mint) = key
                .split('/')
                .find(|name| *name != from_name)
                .and_then(|name| info.mint(name))
            else {
                continue;
            };
            if !mints.contains(&mint) {
                mints.push(mint);
            }
        }
        Ok(mints)
    }

    /// Every route between the two mints resolved into an oriented
    /// pools-pair. Routes that fail to resolve are skipped.
    pub async fn get_tradable_pools_pairs(&self, from_mint: &Pubkey, to_mint: &Pubkey) -> Result<Vec<PoolsPair>, SwapError> {
        let info = self.swap_info()?;
        let (Some(from_name), Some(to_name)) = (info.token_name(from_mint), info.token_name(to_mint)) else {
            return Ok(Vec::new());
        };
        let Some(routes) = info.routes_between(from_name, to_name) else {
            return Ok(Vec::new());
        };

        let resolutions = routes
            .iter()
            .map(|route| self.resolver.pools_for_route(&info, route, from_name, to_name));
        let pairs = join_all(resolutions)
            .await
            .into_iter()
            .zip(routes)
            .filter_map(|(result, route)| match result {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("skipping route {:?} for {from_name}/{to_name}: {e}", route.pool_ids());
                    None
                }
            })
            .collect::<Vec<_>>();

        log::debug!("{} of {} routes tradable for {from_name}/{to_name}", pairs.len(), routes.len());
        Ok(pairs)
    }

    /// Highest output for `input_amount`; `prefers_direct_swap` defaults to
    /// the configured value.
    pub fn find_best_pools_pair_for_input_amount(
        &self,
        input_amount: u64,
        pools_pairs: &[PoolsPair],
        prefers_direct_swap: Option<bool>,
    ) -> Option<PoolsPair> {
        ranker::best_for_input_amount(
            input_amount,
            pools_pairs,
            prefers_direct_swap.unwrap_or(self.config.prefers_direct_swap),
        )
    }

    /// Lowest input for `estimated_amount`; `prefers_direct_swap` defaults to
    /// the configured value.
    pub fn find_best_pools_pair_for_estimated_amount(
        &self,
        estimated_amount: u64,
        pools_pairs: &[PoolsPair],
        prefers_direct_swap: Option<bool>,
    ) -> Option<PoolsPair> {
        ranker::best_for_estimated_amount(
            estimated_amount,
            pools_pairs,
            prefers_direct_swap.unwrap_or(self.config.prefers_direct_swap),
        )
    }

    /// Liquidity-provider fee of each pool, in that pool's output token.
    pub fn get_liquidity_provider_fee(
        &self,
        best_pools_pair: Option<&PoolsPair>,
        input_amount: u64,
        slippage: f64,
    ) -> Result<Vec<u64>, SwapError> {
        match best_pools_pair {
            Some(pair) => pair.liquidity_provider_fees(input_amount, slippage),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_network_fees(&self, context: &NetworkFeeContext<'_>) -> Result<FeeAmount, SwapError> {
        let owner = self.owner()?.pubkey();
        let info = self.swap_info()?;
        estimate_network_fees(self.rpc.as_ref(), &info, &owner, context).await
    }

    pub async fn prepare_for_swapping(&self, request: &SwapRequest<'_>) -> Result<PreparedSwap, SwapError> {
        let owner = self.owner()?;
        let info = self.swap_info()?;
        prepare_for_swapping(
            &info,
            self.rpc.as_ref(),
            &owner,
            request,
            self.config.token_account_span,
        )
        .await
    }

    /// Prepare and execute a swap. The owner pays the fees; any `fee_payer`
    /// on the request is ignored.
    pub async fn swap(&self, request: &SwapRequest<'_>, is_simulation: bool) -> Result<SwapResponse, SwapError> {
        let owner = self.owner()?;
        let request = SwapRequest {
            fee_payer: None,
            ..request.clone()
        };
        let prepared = self.prepare_for_swapping(&request).await?;
        if prepared.transactions.is_empty() || prepared.transactions.len() > 2 {
            return Err(SwapError::InvalidNumberOfTransactions(prepared.transactions.len()));
        }

        let transaction_id = SwapExecutor::new(self.rpc.as_ref(), &owner, &self.config)
            .execute(&prepared.transactions, is_simulation)
            .await?;
        match transaction_id {
            Some(signature) => log::info!("swap finished with transaction {signature}"),
            None => log::info!("swap simulated"),
        }

        Ok(SwapResponse {
            transaction_id,
            new_wallet_pubkey: prepared.new_wallet_pubkey,
        })
    }
}

impl std::fmt::Debug for OrcaSwap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrcaSwap").field("config", &self.config).finish_non_exhaustive()
    }
}

