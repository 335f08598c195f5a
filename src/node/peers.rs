use super::NodeHandle;

/// Nodes a node knows about, in introduction order. The network is a full
/// mesh, so every node ends up in every other node's directory.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    peers: Vec<NodeHandle>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, peer: &NodeHandle) -> bool {
        self.peers.contains(peer)
    }

    /// Returns `false` if the peer was already known.
    pub fn insert(&mut self, peer: NodeHandle) -> bool {
        if self.contains(&peer) {
            return false;
        }
        self.peers.push(peer);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeHandle> {
        self.peers.iter()
    }

    pub fn to_vec(&self) -> Vec<NodeHandle> {
        self.peers.clone()
    }

    /// `first` followed by every peer, skipping `first` if it is listed.
    pub fn with_first(&self, first: NodeHandle) -> Vec<NodeHandle> {
        let mut all = Vec::with_capacity(self.peers.len() + 1);
        all.extend(self.peers.iter().filter(|p| **p != first).cloned());
        all.insert(0, first);
        all
    }
}

impl From<Vec<NodeHandle>> for PeerDirectory {
    fn from(handles: Vec<NodeHandle>) -> Self {
        let mut directory = Self::new();
        for handle in handles {
            directory.insert(handle);
        }
        directory
    }
}
