//! The immutable snapshot built by `load()`.
//!
//! A `SwapInfo` bundles the static token and pool maps, the program ids and
//! the derived routes index. It is never mutated after construction; a reload
//! builds a fresh value and swaps it in whole.

pub mod routes;
pub mod token;

use std::collections::BTreeMap;

use ahash::AHashMap;
use solana_pubkey::Pubkey;

pub use routes::{Route, Routes, build_routes, order_token_pair, trade_id};
pub use token::{ProgramIds, TokenValue};

use crate::{error::SwapError, pool::Pool};

#[derive(Debug, Clone)]
pub struct SwapInfo {
    pub routes: Routes,
    pub tokens: BTreeMap<String, TokenValue>,
    pub pools: BTreeMap<String, Pool>,
    pub program_ids: ProgramIds,
    /// mint -> token name
    pub token_names: AHashMap<Pubkey, String>,
}

impl SwapInfo {
    pub fn new(tokens: BTreeMap<String, TokenValue>, pools: BTreeMap<String, Pool>, program_ids: ProgramIds) -> Self {
        let routes = build_routes(&tokens, &pools);
        let token_names = tokens
            .iter()
            .map(|(name, token)| (token.mint, name.clone()))
            .collect();

        Self {
            routes,
            tokens,
            pools,
            program_ids,
            token_names,
        }
    }

    pub fn token_name(&self, mint: &Pubkey) -> Option<&str> {
        self.token_names.get(mint).map(String::as_str)
    }

    pub fn mint(&self, token_name: &str) -> Option<Pubkey> {
        self.tokens.get(token_name).map(|token| token.mint)
    }

    pub fn mint_or_err(&self, token_name: &str) -> Result<Pubkey, SwapError> {
        self.mint(token_name)
            .ok_or_else(|| SwapError::NotFound(token_name.to_string().into()))
    }

    /// Non-empty route entries for a token pair.
    ///
    /// Without a source nothing matches. Without a destination every entry
    /// mentioning the source is returned.
    pub fn find_routes(&self, from_token: Option<&str>, to_token: Option<&str>) -> Routes {
        let Some(from_token) = from_token else {
            return Routes::new();
        };

        let keys: Vec<String> = match to_token {
            Some(to_token) => vec![format!("{from_token}/{to_token}"), format!("{to_token}/{from_token}")],
            None => Vec::new(),
        };

        self.routes
            .iter()
            .filter(|(key, routes)| {
                !routes.is_empty()
                    && match to_token {
                        Some(_) => keys.contains(key),
                        None => key.split('/').any(|token| token == from_token),
                    }
            })
            .map(|(key, routes)| (key.clone(), routes.clone()))
            .collect()
    }

    /// Routes between two tokens regardless of argument order.
    pub fn routes_between(&self, from_token: &str, to_token: &str) -> Option<&[Route]> {
        self.routes
            .get(&trade_id(from_token, to_token))
            .map(Vec::as_slice)
            .filter(|routes| !routes.is_empty())
    }
}
