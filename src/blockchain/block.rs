use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{self, Digest};
use crate::transaction::{Coin, CoinId};

/// A batch of coin versions sealed by a proof-of-work nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Mutated only during the nonce search.
    #[serde(with = "hex")]
    pub nonce: Vec<u8>,
    /// Hex digest of the previous block; `None` only for genesis.
    pub prev_hash: Option<String>,
    /// Id of the coin minted as this block's reward.
    pub coin_id: CoinId,
    pub coins: Vec<Coin>,
}

impl Block {
    /// Unmined block carrying `reward` as its first coin.
    pub fn new(prev_hash: Option<String>, reward: Coin) -> Self {
        Self {
            nonce: Vec::new(),
            prev_hash,
            coin_id: reward.id,
            coins: vec![reward],
        }
    }

    /// Same block with an externally submitted coin appended.
    pub fn with_coin(mut self, coin: Coin) -> Self {
        self.coins.push(coin);
        self
    }

    pub fn digest(&self) -> Digest {
        crypto::hash(self)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.digest())
    }

    pub fn reward(&self) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == self.coin_id)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hash={}, nonce={}, prev={}, coins={}",
            self.hash_hex(),
            hex::encode(&self.nonce),
            self.prev_hash.as_deref().unwrap_or("-"),
            self.coins.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn reward_coin_is_tracked_by_id() {
        let mut rng = StdRng::seed_from_u64(30);
        let miner = generate_keypair(&mut rng);
        let reward = Coin::mint(miner.public.clone(), &mut rng);
        let extra = Coin::mint(miner.public, &mut rng);
        let block = Block::new(None, reward.clone()).with_coin(extra);
        assert_eq!(block.coin_id, reward.id);
        assert_eq!(block.reward(), Some(&reward));
        assert_eq!(block.coins.len(), 2);
    }

    #[test]
    fn digest_changes_with_nonce() {
        let mut rng = StdRng::seed_from_u64(31);
        let miner = generate_keypair(&mut rng);
        let mut block = Block::new(Some("ab".into()), Coin::mint(miner.public, &mut rng));
        let before = block.digest();
        block.nonce = vec![1, 2, 3];
        assert_ne!(before, block.digest());
    }

    #[test]
    fn serializes_fields_in_canonical_order() {
        let mut rng = StdRng::seed_from_u64(32);
        let miner = generate_keypair(&mut rng);
        let block = Block::new(None, Coin::mint(miner.public, &mut rng));
        let json = String::from_utf8(crate::codec::encode(&block)).unwrap();
        let nonce = json.find("\"nonce\"").unwrap();
        let prev = json.find("\"prev_hash\":null").unwrap();
        let coin_id = json.find("\"coin_id\"").unwrap();
        let coins = json.find("\"coins\"").unwrap();
        assert!(nonce < prev && prev < coin_id && coin_id < coins);
    }
}
