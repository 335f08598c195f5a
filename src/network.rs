//! The simulated network: a fixed set of named nodes in one process.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::NodeSettings;
use crate::crypto::PublicKey;
use crate::node::Node;

pub struct Network {
    nodes: Vec<Node>,
}

impl Network {
    /// Start one node per name and introduce every node to the first one;
    /// flood-join completes the mesh in the background.
    pub fn spawn(names: &[String], settings: NodeSettings, seed: Option<u64>) -> Self {
        let mut root = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let nodes: Vec<Node> = names
            .iter()
            .map(|name| Node::spawn(name, settings, StdRng::seed_from_u64(root.r#gen())))
            .collect();

        if let Some((first, rest)) = nodes.split_first() {
            for node in rest {
                first.add_peer(&node.handle());
            }
        }
        info!(
            "network up: {} node(s), {} zero bits, {} trials per attempt",
            nodes.len(),
            settings.pow.zero_bits,
            settings.trial_budget
        );
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Case-insensitive lookup by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name().eq_ignore_ascii_case(name))
    }

    /// Resolve a receiver given either as a node name or a hex public key.
    pub fn resolve_key(&self, receiver: &str) -> Option<PublicKey> {
        if let Some(node) = self.node(receiver.trim()) {
            return Some(node.public_key().clone());
        }
        PublicKey::from_hex(receiver).ok().filter(|k| !k.as_bytes().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ProofOfWork;
    use std::time::Duration;

    fn settings() -> NodeSettings {
        NodeSettings {
            pow: ProofOfWork::new(8, 20),
            trial_budget: 10_000,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn bootstrap_converges_to_full_mesh() {
        let network = Network::spawn(&names(&["Alice", "Bob", "Carol"]), settings(), Some(1));
        let converged = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let mut sizes = Vec::new();
                for node in network.nodes() {
                    sizes.push(node.peers().await.unwrap().len());
                }
                if sizes.iter().all(|&n| n == 2) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(converged.is_ok());
    }

    #[tokio::test]
    async fn same_seed_gives_same_identities() {
        let a = Network::spawn(&names(&["Alice", "Bob"]), settings(), Some(7));
        let b = Network::spawn(&names(&["Alice", "Bob"]), settings(), Some(7));
        for (x, y) in a.nodes().iter().zip(b.nodes()) {
            assert_eq!(x.public_key(), y.public_key());
        }
    }

    #[tokio::test]
    async fn receivers_resolve_by_name_or_key() {
        let network = Network::spawn(&names(&["Alice", "Bob"]), settings(), Some(3));
        let bob = network.node("bob").unwrap().public_key().clone();
        assert_eq!(network.resolve_key("Bob"), Some(bob.clone()));
        assert_eq!(network.resolve_key(&bob.to_hex()), Some(bob));
        assert_eq!(network.resolve_key("Mallory"), None);
        assert_eq!(network.resolve_key(""), None);
    }
}
