//! `SwapDataSource` over an in-memory token/pool universe, typically parsed
//! from the JSON configuration document:
//!
//! ```json
//! { "tokens": { "SOL": { ... } }, "pools": { "SOL/USDC": { ... } }, "programIds": { ... } }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    chain::SwapDataSource,
    error::{ErrorInfo, SwapError},
    pool::Pool,
    swap_info::{ProgramIds, TokenValue},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigDocument {
    tokens: BTreeMap<String, TokenValue>,
    pools: BTreeMap<String, Pool>,
    #[serde(default)]
    program_ids: ProgramIds,
}

#[derive(Debug, Clone, Default)]
pub struct JsonSwapDataSource {
    tokens: BTreeMap<String, TokenValue>,
    pools: BTreeMap<String, Pool>,
    program_ids: ProgramIds,
}

impl JsonSwapDataSource {
    pub fn new(tokens: BTreeMap<String, TokenValue>, pools: BTreeMap<String, Pool>, program_ids: ProgramIds) -> Self {
        Self {
            tokens,
            pools,
            program_ids,
        }
    }

    /// Parse a configuration document. A missing `programIds` object falls
    /// back to the mainnet program ids.
    pub fn from_json_str(json: &str) -> Result<Self, SwapError> {
        let document: ConfigDocument =
            serde_json::from_str(json).map_err(|e| SwapError::DataSource(ErrorInfo::String(e.to_string())))?;
        log::debug!(
            "parsed swap configuration with {} tokens and {} pools",
            document.tokens.len(),
            document.pools.len()
        );
        Ok(Self::new(document.tokens, document.pools, document.program_ids))
    }
}

#[async_trait]
impl SwapDataSource for JsonSwapDataSource {
    async fn get_tokens(&self) -> Result<BTreeMap<String, TokenValue>, SwapError> {
        Ok(self.tokens.clone())
    }

    async fn get_pools(&self) -> Result<BTreeMap<String, Pool>, SwapError> {
        Ok(self.pools.clone())
    }

    async fn get_program_ids(&self) -> Result<ProgramIds, SwapError> {
        Ok(self.program_ids)
    }
}
