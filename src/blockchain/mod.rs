pub mod block;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::Chain;
pub use pow::ProofOfWork;

/// Reference proof-of-work difficulty (leading zero bits of a block digest).
pub const DEFAULT_ZERO_BITS: u32 = 15;

/// Length in bytes of a random nonce.
pub const DEFAULT_NONCE_LEN: usize = 20;

/// Nonce trials per ordinary mining attempt.
pub const DEFAULT_TRIAL_BUDGET: u64 = 10_000;
