use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::chain::serde_pubkey;

/// Static token definition from the swap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValue {
    #[serde(with = "serde_pubkey")]
    pub mint: Pubkey,
    pub name: String,
    pub decimals: u8,
    #[serde(default)]
    pub fetch_price: Option<bool>,
    /// LP tokens are never route endpoints.
    #[serde(default)]
    pub pool_token: Option<bool>,
    #[serde(default)]
    pub wrapper: Option<String>,
}

impl TokenValue {
    pub fn is_pool_token(&self) -> bool {
        self.pool_token == Some(true)
    }
}

pub const TOKEN_SWAP_V1_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("DjVE6JNiYqPL2QXyCUUh8rNjHrbz9hXHNYt99MQ59qw1");

pub const TOKEN_SWAP_V2_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("9W959DqEETiGZocYWCQPaJ6sBmUzgfxXfqGeTEdp3aQP");

/// Program ids the swap instructions are addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramIds {
    #[serde(with = "serde_pubkey")]
    pub token_swap: Pubkey,
    #[serde(rename = "tokenSwapV2", with = "serde_pubkey")]
    pub token_swap_v2: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub token: Pubkey,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            token_swap: TOKEN_SWAP_V1_PROGRAM_ID,
            token_swap_v2: TOKEN_SWAP_V2_PROGRAM_ID,
            token: spl_token::ID,
        }
    }
}

impl ProgramIds {
    /// Swap program for a pool's `programVersion`; 2 selects v2, anything else v1.
    pub fn swap_program(&self, program_version: Option<u64>) -> Pubkey {
        if program_version == Some(2) {
            self.token_swap_v2
        } else {
            self.token_swap
        }
    }
}
