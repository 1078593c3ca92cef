//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorInfo, SwapError},
    executor::retry::RetryPolicy,
    transaction::accounts::TOKEN_ACCOUNT_SPAN,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Pick the best direct pool over a better two-hop route.
    pub prefers_direct_swap: bool,
    /// How long to wait for the setup transaction of a split swap.
    pub confirmation_timeout: Duration,
    /// Retry policy of the swap transaction of a split swap.
    pub retry: RetryPolicy,
    /// Account size rent exemption is queried for.
    pub token_account_span: usize,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            prefers_direct_swap: true,
            confirmation_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            token_account_span: TOKEN_ACCOUNT_SPAN,
        }
    }
}

impl SwapConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SwapError> {
        serde_json::from_str(json).map_err(|e| SwapError::DataSource(ErrorInfo::String(e.to_string())))
    }
}
