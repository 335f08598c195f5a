use std::collections::{BTreeMap, HashMap};

use crate::blockchain::Chain;
use crate::crypto::PublicKey;
use crate::transaction::{Coin, CoinId};

/// Ownership view derived from a chain: public key -> coins it currently owns.
///
/// Always rebuilt from scratch with [`Wallet::replay`]; never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wallet {
    owners: BTreeMap<PublicKey, Vec<Coin>>,
}

impl Wallet {
    /// Replay every coin version in chain order, keep the last version per
    /// coin id, and bucket by that version's receiver. Coins within a bucket
    /// keep the order in which their ids first appeared.
    pub fn replay(chain: &Chain) -> Self {
        let mut order: Vec<CoinId> = Vec::new();
        let mut latest: HashMap<CoinId, &Coin> = HashMap::new();
        for coin in chain.blocks().iter().flat_map(|b| b.coins.iter()) {
            if latest.insert(coin.id, coin).is_none() {
                order.push(coin.id);
            }
        }

        let mut owners: BTreeMap<PublicKey, Vec<Coin>> = BTreeMap::new();
        for id in order {
            let coin = latest[&id];
            owners
                .entry(coin.owner().clone())
                .or_default()
                .push(coin.clone());
        }
        Self { owners }
    }

    pub fn coins_of(&self, key: &PublicKey) -> &[Coin] {
        self.owners.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn balance_of(&self, key: &PublicKey) -> usize {
        self.coins_of(key).len()
    }

    /// The coin `key` would spend next.
    pub fn first_coin_of(&self, key: &PublicKey) -> Option<&Coin> {
        self.coins_of(key).first()
    }

    /// Some coin owned by anyone other than `key`.
    pub fn first_foreign_coin(&self, key: &PublicKey) -> Option<&Coin> {
        self.owners
            .iter()
            .filter(|(owner, _)| *owner != key)
            .find_map(|(_, coins)| coins.first())
    }

    pub fn total_coins(&self) -> usize {
        self.owners.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PublicKey, &[Coin])> {
        self.owners.iter().map(|(k, v)| (k, v.as_slice()))
    }
}
