//! Route resolution and multi-hop swap construction for token-swap AMM pools.
//!
//! The crate loads a static universe of tokens and pools once, indexes every
//! 1-hop and 2-hop route between tradable tokens, resolves routes into pools
//! carrying live reserve balances, ranks them, estimates fees and finally
//! prepares and submits the (at most two) transactions a swap needs.
//!
//! Entry point is [`orca_swap::OrcaSwap`].

pub mod account_caching;
pub mod chain;
pub mod config;
pub mod error;
pub mod executor;
pub mod fees;
pub mod orca_swap;
pub mod pool;
pub mod pools_pair;
pub mod swap_info;
pub mod transaction;
