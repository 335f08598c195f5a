use std::sync::Arc;

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot, watch};

use super::{LedgerState, Message, NodeHandle, PeerDirectory, broadcast};
use crate::blockchain::{Block, Chain};
use crate::codec;
use crate::config::NodeSettings;
use crate::error::NodeError;
use crate::transaction::Coin;

/// Owner of a node's state. Processes one message at a time, so state
/// transitions are serialized; it never awaits another node itself.
pub(super) struct NodeActor {
    me: NodeHandle,
    settings: NodeSettings,
    peers: PeerDirectory,
    ledger: watch::Sender<Arc<LedgerState>>,
    inbox: mpsc::UnboundedReceiver<Message>,
    rng: StdRng,
}

impl NodeActor {
    pub(super) fn new(
        me: NodeHandle,
        settings: NodeSettings,
        ledger: watch::Sender<Arc<LedgerState>>,
        inbox: mpsc::UnboundedReceiver<Message>,
        rng: StdRng,
    ) -> Self {
        Self {
            me,
            settings,
            peers: PeerDirectory::new(),
            ledger,
            inbox,
            rng,
        }
    }

    pub(super) async fn run(mut self) {
        while let Some(message) = self.inbox.recv().await {
            match message {
                Message::SyncChain { payload, reply } => {
                    let _ = reply.send(self.sync_chain(&payload));
                }
                Message::Submit { payload, reply } => self.start_mining(payload, reply),
                Message::AddPeer { peer } => self.add_peer(peer),
                Message::Peers { reply } => {
                    let _ = reply.send(self.peers.to_vec());
                }
            }
        }
        debug!("{}: inbox closed", self.me.name());
    }

    fn sync_chain(&self, payload: &[u8]) -> Result<(), NodeError> {
        let name = self.me.name();
        let candidate: Chain = codec::decode(payload)
            .inspect_err(|e| warn!("{name}: block rejected (malformed chain: {e})"))?;

        let local = self.ledger.borrow().chain.len();
        if candidate.len() <= local {
            debug!("{name}: block rejected (chain too short: {} <= {local})", candidate.len());
            return Err(NodeError::ChainTooShort {
                candidate: candidate.len(),
                local,
            });
        }

        if let Err(e) = self.settings.pow.validate_chain(&candidate) {
            warn!("{name}: block rejected ({}. {e})", e.code());
            return Err(e.into());
        }

        if let Some(tip) = candidate.last_block() {
            info!("{name}: new block accepted: {tip}");
        }
        self.ledger.send_replace(Arc::new(LedgerState::adopt(candidate)));
        Ok(())
    }

    /// Mining runs as its own task so the inbox keeps draining; the reply
    /// is sent once the attempt and its broadcast are over.
    fn start_mining(&mut self, payload: Option<Vec<u8>>, reply: oneshot::Sender<bool>) {
        let submitted = match payload.map(|p| codec::decode::<Coin>(&p)).transpose() {
            Ok(coin) => coin,
            Err(e) => {
                warn!("{}: submission rejected (malformed coin: {e})", self.me.name());
                let _ = reply.send(false);
                return;
            }
        };

        let job = MiningJob {
            miner: self.me.clone(),
            peers: self.peers.to_vec(),
            settings: self.settings,
            ledger: self.ledger.subscribe(),
            submitted,
            rng: StdRng::seed_from_u64(self.rng.r#gen()),
        };
        tokio::spawn(async move {
            let _ = reply.send(job.run().await);
        });
    }

    /// Flood-join: introduce a new peer to everyone already known (and them
    /// to it), then introduce ourselves. Known peers and self are no-ops,
    /// which is what stops the flood.
    fn add_peer(&mut self, peer: NodeHandle) {
        if peer == self.me || self.peers.contains(&peer) {
            return;
        }
        for known in self.peers.iter() {
            known.add_peer(peer.clone());
            peer.add_peer(known.clone());
        }
        peer.add_peer(self.me.clone());
        info!("{}: peer added: {}", self.me.name(), peer.name());
        self.peers.insert(peer);
    }
}

/// One bounded mining attempt on top of the chain as it was when the
/// submission arrived. Reports success only if the miner's own node
/// adopted the block; a chain adopted meanwhile makes it stale.
struct MiningJob {
    miner: NodeHandle,
    peers: Vec<NodeHandle>,
    settings: NodeSettings,
    ledger: watch::Receiver<Arc<LedgerState>>,
    submitted: Option<Coin>,
    rng: StdRng,
}

impl MiningJob {
    async fn run(self) -> bool {
        let MiningJob {
            miner,
            peers,
            settings,
            ledger,
            submitted,
            mut rng,
        } = self;
        let name = miner.name();

        let base = ledger.borrow().clone();
        let mut block = Block::new(
            base.chain.tip_hash(),
            Coin::mint(miner.public_key().clone(), &mut rng),
        );
        if let Some(coin) = submitted {
            block = block.with_coin(coin);
        }

        let NodeSettings { pow, trial_budget } = settings;
        let search = tokio::task::spawn_blocking(move || {
            let found = pow.find(&mut block, Some(trial_budget), &mut rng);
            (found, block)
        })
        .await;
        let block = match search {
            Ok((true, block)) => block,
            Ok((false, _)) => {
                debug!("{name}: no proof within {trial_budget} trials");
                return false;
            }
            Err(e) => {
                error!("{name}: mining worker failed: {e}");
                return false;
            }
        };

        let stale = ledger.borrow().chain.tip_hash() != block.prev_hash;
        if stale {
            debug!("{name}: discarding stale block, local chain moved on");
            return false;
        }

        info!("{name}: new block found: {block}");
        let payload = codec::encode(&base.chain.appended(block));
        match miner.sync_chain(payload.clone()).await {
            Ok(()) => {}
            Err(NodeError::ChainTooShort { .. }) => {
                debug!("{name}: discarding stale block, an equally long chain was adopted first");
                return false;
            }
            // invalid submitted coin: the block is dead, but the submission is settled
            Err(e) => debug!("{name}: own chain kept: {e}"),
        }
        broadcast(name, &peers, &payload).await;
        true
    }
}
