//! Rejection taxonomy. None of these are process-fatal.

use thiserror::Error;

use crate::transaction::CoinId;

/// Failure of a single coin's transaction chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxChainError {
    #[error("coin {coin} version {version}: previous transaction hash mismatch")]
    PrevHashMismatch { coin: CoinId, version: usize },
    #[error("coin {coin} version {version}: signature not made by previous owner")]
    SignatureInvalid { coin: CoinId, version: usize },
}

impl TxChainError {
    pub fn code(&self) -> u8 {
        match self {
            TxChainError::PrevHashMismatch { .. } => 1,
            TxChainError::SignatureInvalid { .. } => 2,
        }
    }
}

/// Failure of a whole candidate chain. `code()` identifies exactly one of
/// five categories; 0 is reserved for an accepted chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("not mined block at height {height}")]
    PowFailed { height: usize },
    #[error("illegal previous block hash at height {height}")]
    PrevHashMismatch { height: usize },
    #[error("not mined coin {coin}")]
    UnminedCoin { coin: CoinId },
    #[error(transparent)]
    Transaction(#[from] TxChainError),
}

impl ChainError {
    /// Transaction-chain codes are shifted past the block-level ones.
    pub const TX_CODE_OFFSET: u8 = 3;

    pub fn code(&self) -> u8 {
        match self {
            ChainError::PowFailed { .. } => 1,
            ChainError::PrevHashMismatch { .. } => 2,
            ChainError::UnminedCoin { .. } => 3,
            ChainError::Transaction(e) => Self::TX_CODE_OFFSET + e.code(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("no coins to send")]
    NoFunds,
    #[error("illegal operation: unknown mode {0}")]
    IllegalMode(u8),
    #[error("illegal operation: no eligible coin for {0}")]
    NoEligibleCoin(&'static str),
    #[error("chain too short: candidate has {candidate} blocks, local chain has {local}")]
    ChainTooShort { candidate: usize, local: usize },
    #[error("chain rejected ({}): {0}", .0.code())]
    Rejected(#[from] ChainError),
    #[error("malformed payload: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("node {0} is unreachable")]
    Unreachable(String),
    #[error("mining worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
