#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap, HashSet, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_transaction::Transaction;
use spl_token::native_mint;

use orca_swap_router::{
    chain::{RpcError, SolanaRpc, TokenAccountBalance},
    pool::{CurveType, Pool},
    swap_info::{ProgramIds, SwapInfo, TokenValue},
};

pub const MIN_RENT_EXEMPTION: u64 = 2_039_280;
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory cluster: token balances, existing associated accounts and a
/// script of send outcomes.
#[derive(Default)]
pub struct MockRpc {
    balances: Mutex<HashMap<Pubkey, TokenAccountBalance>>,
    associated_accounts: Mutex<HashSet<(Pubkey, Pubkey)>>,
    /// `Some(logs)` fails the matching send, `None` lets it through.
    send_script: Mutex<VecDeque<Option<Vec<String>>>>,
    confirmation_times_out: AtomicBool,
    pub balance_requests: AtomicUsize,
    pub confirmation_requests: AtomicUsize,
    pub send_attempts: AtomicUsize,
    pub sent: Mutex<Vec<Transaction>>,
    pub simulated: Mutex<Vec<Transaction>>,
}

impl MockRpc {
    pub fn set_balance(&self, account: Pubkey, amount: u64, decimals: u8) {
        self.balances
            .lock()
            .unwrap()
            .insert(account, TokenAccountBalance::new(amount, decimals));
    }

    pub fn remove_balance(&self, account: &Pubkey) {
        self.balances.lock().unwrap().remove(account);
    }

    pub fn add_associated_account(&self, owner: Pubkey, mint: Pubkey) {
        self.associated_accounts.lock().unwrap().insert((owner, mint));
    }

    /// Outcomes of the next sends and simulations, in order.
    pub fn script_sends(&self, outcomes: impl IntoIterator<Item = Option<Vec<String>>>) {
        self.send_script.lock().unwrap().extend(outcomes);
    }

    pub fn time_out_confirmations(&self) {
        self.confirmation_times_out.store(true, Ordering::SeqCst);
    }

    fn next_outcome(&self) -> Result<(), RpcError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        match self.send_script.lock().unwrap().pop_front().flatten() {
            Some(logs) => Err(RpcError::TransactionError {
                message: "Transaction simulation failed".to_string(),
                logs,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_token_account_balance(&self, account: &Pubkey) -> Result<TokenAccountBalance, RpcError> {
        self.balance_requests.fetch_add(1, Ordering::SeqCst);
        self.balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .ok_or_else(|| RpcError::InvalidResponse(format!("could not find account {account}")))
    }

    async fn associated_token_account_exists(&self, owner: &Pubkey, mint: &Pubkey) -> Result<bool, RpcError> {
        Ok(self.associated_accounts.lock().unwrap().contains(&(*owner, *mint)))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, _span: usize) -> Result<u64, RpcError> {
        Ok(MIN_RENT_EXEMPTION)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(Hash::default())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        self.next_outcome()?;
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn simulate_transaction(&self, transaction: &Transaction) -> Result<(), RpcError> {
        self.next_outcome()?;
        self.simulated.lock().unwrap().push(transaction.clone());
        Ok(())
    }

    async fn wait_for_confirmation(&self, signature: &Signature, _timeout: Duration) -> Result<(), RpcError> {
        self.confirmation_requests.fetch_add(1, Ordering::SeqCst);
        if self.confirmation_times_out.load(Ordering::SeqCst) {
            return Err(RpcError::ConfirmationTimeout(*signature));
        }
        Ok(())
    }
}

pub fn token(mint: Pubkey, decimals: u8) -> TokenValue {
    TokenValue {
        mint,
        name: String::new(),
        decimals,
        fetch_price: Some(true),
        pool_token: None,
        wrapper: None,
    }
}

pub fn pool(token_a: &str, token_b: &str, curve_type: CurveType) -> Pool {
    Pool {
        account: Pubkey::new_unique(),
        authority: Pubkey::new_unique(),
        nonce: 255,
        pool_token_mint: Pubkey::new_unique(),
        token_account_a: Pubkey::new_unique(),
        token_account_b: Pubkey::new_unique(),
        fee_account: Pubkey::new_unique(),
        host_fee_account: None,
        fee_numerator: 25,
        fee_denominator: 10_000,
        owner_trade_fee_numerator: 5,
        owner_trade_fee_denominator: 10_000,
        owner_withdraw_fee_numerator: 0,
        owner_withdraw_fee_denominator: 0,
        host_fee_numerator: 0,
        host_fee_denominator: 0,
        token_a_name: token_a.to_string(),
        token_b_name: token_b.to_string(),
        curve_type,
        amp: None,
        program_version: Some(2),
        deprecated: None,
        token_a_balance: None,
        token_b_balance: None,
        is_stable: false,
    }
}

pub fn stable_pool(token_a: &str, token_b: &str) -> Pool {
    Pool {
        amp: Some(100),
        fee_numerator: 4,
        owner_trade_fee_numerator: 0,
        owner_trade_fee_denominator: 0,
        ..pool(token_a, token_b, CurveType::Stable)
    }
}

pub const SOL_BTC: &str = "SOL/BTC[aquafarm]";
pub const SOL_USDC: &str = "SOL/USDC[aquafarm]";
pub const ETH_USDC: &str = "ETH/USDC[aquafarm]";
pub const ETH_SOL: &str = "ETH/SOL[aquafarm]";
pub const USDC_USDT: &str = "USDC/USDT[stable]";

/// Token/pool universe:
///
/// ```text
/// BTC - SOL - USDC - USDT
///         \    /
///          ETH
/// ```
///
/// plus the `SOL/USDC` LP token, which must never become a route endpoint.
pub struct Fixture {
    pub tokens: BTreeMap<String, TokenValue>,
    pub pools: BTreeMap<String, Pool>,
    pub rpc: Arc<MockRpc>,
    pub owner: Arc<Keypair>,
}

impl Fixture {
    pub fn new() -> Self {
        let mut tokens = BTreeMap::new();
        tokens.insert("SOL".to_string(), token(native_mint::ID, 9));
        tokens.insert("BTC".to_string(), token(Pubkey::new_unique(), 6));
        tokens.insert("ETH".to_string(), token(Pubkey::new_unique(), 8));
        tokens.insert("USDC".to_string(), token(Pubkey::new_unique(), 6));
        tokens.insert("USDT".to_string(), token(Pubkey::new_unique(), 6));
        tokens.insert(
            SOL_USDC.to_string(),
            TokenValue {
                pool_token: Some(true),
                ..token(Pubkey::new_unique(), 6)
            },
        );

        let rpc = Arc::new(MockRpc::default());
        let mut pools = BTreeMap::new();
        let mut add = |id: &str, pool: Pool, reserve_a: u64, reserve_b: u64| {
            let decimals = |name: &str| tokens[name].decimals;
            rpc.set_balance(pool.token_account_a, reserve_a, decimals(&pool.token_a_name));
            rpc.set_balance(pool.token_account_b, reserve_b, decimals(&pool.token_b_name));
            pools.insert(id.to_string(), pool);
        };
        add(SOL_BTC, pool("SOL", "BTC", CurveType::ConstantProduct), 1_000_000_000_000, 2_500_000_000);
        add(SOL_USDC, pool("SOL", "USDC", CurveType::ConstantProduct), 1_000_000_000_000, 150_000_000_000);
        add(ETH_USDC, pool("ETH", "USDC", CurveType::ConstantProduct), 100_000_000_000, 2_000_000_000_000);
        add(ETH_SOL, pool("ETH", "SOL", CurveType::ConstantProduct), 10_000_000_000, 1_333_000_000_000);
        add(USDC_USDT, stable_pool("USDC", "USDT"), 1_000_000_000_000, 1_000_000_000_000);

        Self {
            tokens,
            pools,
            rpc,
            owner: Arc::new(Keypair::new()),
        }
    }

    pub fn info(&self) -> SwapInfo {
        SwapInfo::new(self.tokens.clone(), self.pools.clone(), ProgramIds::default())
    }

    pub fn mint(&self, name: &str) -> Pubkey {
        self.tokens[name].mint
    }

    /// Pool with its reserve balances attached, read A -> B.
    pub fn resolved_pool(&self, id: &str) -> Pool {
        let balances = self.rpc.balances.lock().unwrap();
        let mut pool = self.pools[id].clone();
        pool.token_a_balance = balances.get(&pool.token_account_a).copied();
        pool.token_b_balance = balances.get(&pool.token_account_b).copied();
        pool
    }
}
