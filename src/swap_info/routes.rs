//! Route index construction.
//!
//! Every unordered pair of tradable tokens gets exactly one entry, keyed by
//! the canonical `"A/B"` trade id, listing the direct pools joining the two
//! tokens and every two-pool path through a single intermediary token.

use std::collections::BTreeMap;

use crate::{pool::Pool, swap_info::TokenValue};

/// Routes index keyed by canonical trade id.
pub type Routes = BTreeMap<String, Vec<Route>>;

/// An ordered path of pool identifiers, one or two hops long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Direct(String),
    Transitive(String, String),
}

impl Route {
    pub fn pool_ids(&self) -> Vec<&str> {
        match self {
            Route::Direct(pool) => vec![pool.as_str()],
            Route::Transitive(first, second) => vec![first.as_str(), second.as_str()],
        }
    }

    pub fn hops(&self) -> usize {
        match self {
            Route::Direct(_) => 1,
            Route::Transitive(..) => 2,
        }
    }
}

fn is_stable_coin(token: &str) -> bool {
    token == "USDC" || token == "USDT"
}

/// Canonical ordering of two token names.
///
/// `USDC/USDT` stays as is, otherwise a stable coin goes second, otherwise
/// the names are sorted.
pub fn order_token_pair<'a>(token_x: &'a str, token_y: &'a str) -> (&'a str, &'a str) {
    match (token_x, token_y) {
        ("USDC", "USDT") | ("USDT", "USDC") => ("USDC", "USDT"),
        (x, y) if is_stable_coin(y) => (x, y),
        (x, y) if is_stable_coin(x) => (y, x),
        (x, y) if x < y => (x, y),
        (x, y) => (y, x),
    }
}

pub fn trade_id(token_x: &str, token_y: &str) -> String {
    let (first, second) = order_token_pair(token_x, token_y);
    format!("{first}/{second}")
}

fn connects(pool: &Pool, token_x: &str, token_y: &str) -> bool {
    (pool.token_a_name == token_x && pool.token_b_name == token_y)
        || (pool.token_a_name == token_y && pool.token_b_name == token_x)
}

/// All one- and two-hop routes between `token_a` and `token_b`.
pub fn routes_for_pair(token_a: &str, token_b: &str, pools: &BTreeMap<String, Pool>) -> Vec<Route> {
    let mut routes: Vec<Route> = pools
        .iter()
        .filter(|(_, pool)| connects(pool, token_a, token_b))
        .map(|(id, _)| Route::Direct(id.clone()))
        .collect();

    // pool id -> intermediary token
    let first_legs = pools.iter().filter_map(|(id, pool)| {
        if pool.token_a_name == token_a && pool.token_b_name != token_b {
            Some((id, pool.token_b_name.as_str()))
        } else if pool.token_b_name == token_a && pool.token_a_name != token_b {
            Some((id, pool.token_a_name.as_str()))
        } else {
            None
        }
    });

    for (first_leg, intermediary) in first_legs {
        routes.extend(
            pools
                .iter()
                .filter(|(_, pool)| connects(pool, intermediary, token_b))
                .map(|(second_leg, _)| Route::Transitive(first_leg.clone(), second_leg.clone())),
        );
    }

    routes
}

/// Build the routes index over every pair of non-LP tokens.
pub fn build_routes(tokens: &BTreeMap<String, TokenValue>, pools: &BTreeMap<String, Pool>) -> Routes {
    let names: Vec<&str> = tokens
        .iter()
        .filter(|(_, token)| !token.is_pool_token())
        .map(|(name, _)| name.as_str())
        .collect();

    let mut routes = Routes::new();
    for (i, token_x) in names.iter().enumerate() {
        for token_y in &names[i + 1..] {
            let (token_a, token_b) = order_token_pair(token_x, token_y);
            routes.insert(trade_id(token_a, token_b), routes_for_pair(token_a, token_b, pools));
        }
    }
    routes
}
