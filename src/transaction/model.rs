use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{self, PrivateKey, PublicKey, Signature};

/// Stable identifier shared by every version of a coin.
pub type CoinId = Uuid;

/// One transfer record for a coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Hex digest of the previous coin version; empty when minted.
    pub prev_hash: String,
    pub receiver_public_key: PublicKey,
}

/// A single version of a coin. Each transfer produces a new `Coin` value
/// with the same `id`; the ordered versions form its transaction chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CoinId,
    pub tx: Transaction,
    /// Signature over `tx` by the previous owner; empty when minted.
    pub sender_signature: Signature,
}

impl Coin {
    /// Fresh coin owned by `receiver`. Only valid on chain as a block reward.
    pub fn mint<R: Rng + ?Sized>(receiver: PublicKey, rng: &mut R) -> Self {
        let id = uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid();
        Self {
            id,
            tx: Transaction {
                prev_hash: String::new(),
                receiver_public_key: receiver,
            },
            sender_signature: Signature::empty(),
        }
    }

    /// Next version of this coin, handed to `receiver` and signed by the
    /// current owner's private key.
    pub fn transfer(&self, sender: &PrivateKey, receiver: PublicKey) -> Self {
        let tx = Transaction {
            prev_hash: crypto::hash_hex(self),
            receiver_public_key: receiver,
        };
        let sender_signature = crypto::sign(&tx, sender);
        Self {
            id: self.id,
            tx,
            sender_signature,
        }
    }

    pub fn owner(&self) -> &PublicKey {
        &self.tx.receiver_public_key
    }

    pub fn is_minted(&self) -> bool {
        self.tx.prev_hash.is_empty() && self.sender_signature.is_empty()
    }
}
