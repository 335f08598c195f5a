//! Deliberately invalid submissions, used to show that honest nodes reject
//! them. Coin forgeries go through the normal submission path; chain
//! forgeries are broadcast directly as a longer chain.

use std::fmt;

use rand::Rng;

use crate::blockchain::{Block, Chain, ProofOfWork};
use crate::crypto::{KeyPair, PublicKey};
use crate::error::NodeError;
use crate::transaction::Coin;
use crate::wallet::Wallet;

const TAMPERED_COIN_HASH: &str = "aaaaaaaaaa";
const FORGED_BLOCK_LINK: &str = "aaaa";
const FORGED_NONCE: &[u8] = b"aaaaaaaaaa";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attack {
    /// Transfer a coin owned by someone else.
    ForeignCoin = 1,
    /// Transfer a coin that no block ever minted.
    UnminedCoin = 2,
    /// Transfer an own coin whose previous version was altered first.
    TamperedPrevHash = 3,
    /// A one-block chain broadcast as if it were the longest.
    ShortChain = 4,
    /// Extend the chain with a block whose nonce was set by hand.
    UnminedBlock = 5,
    /// Extend the chain with a mined block pointing at a bogus parent.
    ForgedBlockLink = 6,
}

impl Attack {
    pub fn from_mode(mode: u8) -> Result<Self, NodeError> {
        Ok(match mode {
            1 => Attack::ForeignCoin,
            2 => Attack::UnminedCoin,
            3 => Attack::TamperedPrevHash,
            4 => Attack::ShortChain,
            5 => Attack::UnminedBlock,
            6 => Attack::ForgedBlockLink,
            _ => return Err(NodeError::IllegalMode(mode)),
        })
    }

    pub fn mode(self) -> u8 {
        self as u8
    }

    pub fn forges_coin(self) -> bool {
        matches!(
            self,
            Attack::ForeignCoin | Attack::UnminedCoin | Attack::TamperedPrevHash
        )
    }
}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Attack::ForeignCoin => "other's coin",
            Attack::UnminedCoin => "not mined coin",
            Attack::TamperedPrevHash => "illegal previous coin hash",
            Attack::ShortChain => "too short chain",
            Attack::UnminedBlock => "not mined block",
            Attack::ForgedBlockLink => "illegal previous block hash",
        };
        write!(f, "{}. {what}", self.mode())
    }
}

/// Build the coin version submitted by a coin forgery.
pub(super) fn forge_coin<R: Rng + ?Sized>(
    attack: Attack,
    wallet: &Wallet,
    keys: &KeyPair,
    receiver: &PublicKey,
    rng: &mut R,
) -> Result<Coin, NodeError> {
    match attack {
        Attack::ForeignCoin => {
            let coin = wallet
                .first_foreign_coin(&keys.public)
                .ok_or(NodeError::NoEligibleCoin("a foreign coin transfer"))?;
            Ok(coin.transfer(&keys.private, receiver.clone()))
        }
        Attack::UnminedCoin => {
            let phantom = Coin::mint(keys.public.clone(), rng);
            Ok(phantom.transfer(&keys.private, receiver.clone()))
        }
        Attack::TamperedPrevHash => {
            let mut base = wallet
                .first_coin_of(&keys.public)
                .cloned()
                .ok_or(NodeError::NoEligibleCoin("a tampered coin transfer"))?;
            base.tx.prev_hash = TAMPERED_COIN_HASH.to_string();
            Ok(base.transfer(&keys.private, receiver.clone()))
        }
        _ => Err(NodeError::IllegalMode(attack.mode())),
    }
}

/// Build the chain broadcast by a chain forgery. Proof searches here are
/// unbounded, so call this off the async runtime.
pub(super) fn forge_chain<R: Rng + ?Sized>(
    attack: Attack,
    chain: &Chain,
    miner: PublicKey,
    pow: &ProofOfWork,
    rng: &mut R,
) -> Result<Chain, NodeError> {
    match attack {
        Attack::ShortChain => {
            let mut genesis = Block::new(None, Coin::mint(miner, rng));
            pow.find(&mut genesis, None, rng);
            Ok(Chain::new().appended(genesis))
        }
        Attack::UnminedBlock => {
            let mut block = Block::new(chain.tip_hash(), Coin::mint(miner, rng));
            block.nonce = FORGED_NONCE.to_vec();
            while pow.is_mined(&block) {
                block.nonce.push(b'a');
            }
            Ok(chain.appended(block))
        }
        Attack::ForgedBlockLink => {
            let mut block = Block::new(Some(FORGED_BLOCK_LINK.to_string()), Coin::mint(miner, rng));
            pow.find(&mut block, None, rng);
            Ok(chain.appended(block))
        }
        _ => Err(NodeError::IllegalMode(attack.mode())),
    }
}
