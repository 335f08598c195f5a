use std::collections::HashMap;

use rand::Rng;

use super::{Block, Chain, DEFAULT_NONCE_LEN, DEFAULT_ZERO_BITS};
use crate::error::ChainError;
use crate::transaction::{Coin, CoinId, validate_versions};

/// Proof-of-work parameters: a block is mined when its digest starts with
/// `zero_bits` zero bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    pub zero_bits: u32,
    pub nonce_len: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self {
            zero_bits: DEFAULT_ZERO_BITS,
            nonce_len: DEFAULT_NONCE_LEN,
        }
    }
}

/// Number of leading zero bits, most significant bit first.
pub fn leading_zero_bits(digest: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in digest {
        if *byte != 0 {
            return bits + byte.leading_zeros();
        }
        bits += 8;
    }
    bits
}

impl ProofOfWork {
    pub fn new(zero_bits: u32, nonce_len: usize) -> Self {
        Self {
            zero_bits,
            nonce_len,
        }
    }

    pub fn is_mined(&self, block: &Block) -> bool {
        leading_zero_bits(&block.digest()) >= self.zero_bits
    }

    /// Search for a nonce that seals `block`, trying at most `max_trials`
    /// digests (`None` searches without bound). On success `block.nonce`
    /// holds the winning value.
    pub fn find<R: Rng + ?Sized>(
        &self,
        block: &mut Block,
        max_trials: Option<u64>,
        rng: &mut R,
    ) -> bool {
        let mut trials = 0u64;
        loop {
            if max_trials.is_some_and(|max| trials >= max) {
                return false;
            }
            if self.is_mined(block) {
                return true;
            }
            let mut nonce = vec![0u8; self.nonce_len];
            rng.fill_bytes(&mut nonce);
            block.nonce = nonce;
            trials += 1;
        }
    }

    /// Validate a candidate chain. Categories are checked in fixed
    /// precedence over the whole chain, so the first violated category
    /// wins regardless of where in the chain it occurs:
    /// proof-of-work, block linkage, unmined coins, then each coin's
    /// transaction chain.
    pub fn validate_chain(&self, chain: &Chain) -> Result<(), ChainError> {
        let blocks = chain.blocks();

        if let Some(height) = blocks.iter().position(|b| !self.is_mined(b)) {
            return Err(ChainError::PowFailed { height });
        }

        for (height, block) in blocks.iter().enumerate() {
            let expected = match height {
                0 => None,
                _ => Some(blocks[height - 1].hash_hex()),
            };
            if block.prev_hash != expected {
                return Err(ChainError::PrevHashMismatch { height });
            }
        }

        if let Some(block) = blocks.iter().find(|b| b.reward().is_none()) {
            return Err(ChainError::UnminedCoin {
                coin: block.coin_id,
            });
        }

        // A coin's history must start as a fresh mint in the block that
        // declares it as reward. Versions are grouped per id, ids kept in
        // order of first appearance.
        let mut order: Vec<CoinId> = Vec::new();
        let mut versions: HashMap<CoinId, Vec<&Coin>> = HashMap::new();
        for (block, coin) in blocks.iter().flat_map(|b| b.coins.iter().map(move |c| (b, c))) {
            let first = !versions.contains_key(&coin.id);
            if first && (coin.id != block.coin_id || !coin.is_minted()) {
                return Err(ChainError::UnminedCoin { coin: coin.id });
            }
            versions
                .entry(coin.id)
                .or_insert_with(|| {
                    order.push(coin.id);
                    Vec::new()
                })
                .push(coin);
        }

        for id in &order {
            validate_versions(versions[id].iter().copied())?;
        }
        Ok(())
    }
}
