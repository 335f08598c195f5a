use serde::{Deserialize, Serialize};

use super::Block;

/// A node's ordered block sequence, index 0 = genesis.
///
/// Serializes as a plain array of blocks; that array is the payload of a
/// chain broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Digest a new block must point at, `None` for an empty chain.
    pub fn tip_hash(&self) -> Option<String> {
        self.blocks.last().map(Block::hash_hex)
    }

    /// Copy of this chain with `block` appended; `self` is left untouched.
    pub fn appended(&self, block: Block) -> Self {
        let mut blocks = Vec::with_capacity(self.blocks.len() + 1);
        blocks.extend_from_slice(&self.blocks);
        blocks.push(block);
        Self { blocks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;
    use crate::transaction::Coin;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn appended_leaves_original_intact() {
        let mut rng = StdRng::seed_from_u64(40);
        let miner = generate_keypair(&mut rng);
        let genesis = Block::new(None, Coin::mint(miner.public.clone(), &mut rng));
        let chain = Chain::new().appended(genesis.clone());

        let next = Block::new(chain.tip_hash(), Coin::mint(miner.public, &mut rng));
        let longer = chain.appended(next);

        assert_eq!(chain.len(), 1);
        assert_eq!(longer.len(), 2);
        assert_eq!(longer.blocks()[1].prev_hash, Some(genesis.hash_hex()));
    }

    #[test]
    fn empty_chain_has_no_tip() {
        assert_eq!(Chain::new().tip_hash(), None);
        assert!(Chain::new().is_empty());
    }

    #[test]
    fn wire_form_is_a_block_array() {
        let chain = Chain::new();
        assert_eq!(crate::codec::encode(&chain), b"[]");
    }
}
