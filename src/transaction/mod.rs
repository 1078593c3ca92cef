//! Instruction assembly for swaps.
//!
//! [`accounts`] prepares token accounts (associated accounts, temporary
//! wrapped-SOL accounts), [`exchange`] emits the swap instructions of one pool
//! or a whole pools-pair, and [`preparer`] decides how the result is split
//! into one or two transactions.

pub mod accounts;
pub mod exchange;
pub mod preparer;

use std::sync::Arc;

use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use solana_sdk::{signature::Keypair, signer::Signer};

use crate::{chain::SolanaRpc, swap_info::SwapInfo};

pub use preparer::{PreparedSwap, SwapRequest, prepare_for_swapping};

/// An account plus the instructions that bring it into existence and tear
/// it down again.
#[derive(Debug, Clone)]
pub struct AccountInstructions {
    pub account: Pubkey,
    pub instructions: Vec<Instruction>,
    pub cleanup_instructions: Vec<Instruction>,
    /// Extra signers, e.g. the keypair of a freshly created account.
    pub signers: Vec<Arc<Keypair>>,
}

impl AccountInstructions {
    /// An account that already exists and needs nothing.
    pub fn new(account: Pubkey) -> Self {
        Self {
            account,
            instructions: Vec::new(),
            cleanup_instructions: Vec::new(),
            signers: Vec::new(),
        }
    }
}

/// One transaction ready to be signed and sent.
#[derive(Debug, Clone)]
pub struct PreparedSwapTransaction {
    pub instructions: Vec<Instruction>,
    /// Owner first, then any account signers.
    pub signers: Vec<Arc<Keypair>>,
    /// Lamports reserved as rent for accounts the transaction creates.
    pub account_creation_fee: u64,
}

/// Everything instruction assembly needs besides the swap itself.
pub struct SwapContext<'a> {
    pub info: &'a SwapInfo,
    pub rpc: &'a dyn SolanaRpc,
    pub owner: &'a Arc<Keypair>,
    pub fee_payer: Option<Pubkey>,
    pub slippage: f64,
    pub min_rent_exemption: u64,
}

impl SwapContext<'_> {
    pub fn owner_pubkey(&self) -> Pubkey {
        self.owner.pubkey()
    }

    pub fn payer(&self) -> Pubkey {
        self.fee_payer.unwrap_or_else(|| self.owner.pubkey())
    }
}
