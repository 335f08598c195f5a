//! Participants of the simulated network.
//!
//! Every node is an actor: a tokio task that exclusively owns its chain,
//! derived wallet and peer set. Other nodes reach it only through a
//! [`NodeHandle`] (`sync_chain`, `receive_submission`, `add_peer`). The
//! operator-facing [`Node`] holds the key pair and drives mining, sends
//! and the adversarial test operations.

mod actor;
mod adversary;
mod peers;

use std::fmt;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot, watch};

use crate::blockchain::Chain;
use crate::codec;
use crate::config::NodeSettings;
use crate::crypto::{KeyPair, PublicKey, generate_keypair};
use crate::error::NodeError;
use crate::transaction::Coin;
use crate::wallet::Wallet;

pub use adversary::Attack;
pub use peers::PeerDirectory;

use actor::NodeActor;

/// The authoritative state slot of a node. Replaced as a whole whenever a
/// longer valid chain is adopted, so chain and wallet always agree.
#[derive(Debug, Default)]
pub struct LedgerState {
    pub chain: Chain,
    pub wallet: Wallet,
}

impl LedgerState {
    pub fn adopt(chain: Chain) -> Self {
        let wallet = Wallet::replay(&chain);
        Self { chain, wallet }
    }
}

pub(crate) enum Message {
    SyncChain {
        payload: Vec<u8>,
        reply: oneshot::Sender<Result<(), NodeError>>,
    },
    Submit {
        payload: Option<Vec<u8>>,
        reply: oneshot::Sender<bool>,
    },
    AddPeer {
        peer: NodeHandle,
    },
    Peers {
        reply: oneshot::Sender<Vec<NodeHandle>>,
    },
}

/// Address of a node's actor. This is the whole peer wire contract.
#[derive(Clone)]
pub struct NodeHandle {
    name: Arc<str>,
    public_key: PublicKey,
    inbox: mpsc::UnboundedSender<Message>,
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for NodeHandle {}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({}, {})", self.name, self.public_key)
    }
}

impl NodeHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Offer an encoded chain. The node adopts it only if it is strictly
    /// longer than its own and fully valid.
    pub async fn sync_chain(&self, payload: Vec<u8>) -> Result<(), NodeError> {
        let (reply, verdict) = oneshot::channel();
        self.post(Message::SyncChain { payload, reply })?;
        verdict.await.map_err(|_| self.unreachable())?
    }

    /// Ask the node to attempt one bounded mining round, including the
    /// encoded coin when given. `true` means a block was mined and
    /// broadcast, so the submitter can stop retrying.
    pub async fn receive_submission(&self, payload: Option<Vec<u8>>) -> bool {
        let (reply, mined) = oneshot::channel();
        if self.post(Message::Submit { payload, reply }).is_err() {
            return false;
        }
        mined.await.unwrap_or(false)
    }

    pub fn add_peer(&self, peer: NodeHandle) {
        if let Err(e) = self.post(Message::AddPeer { peer }) {
            warn!("{e}");
        }
    }

    pub async fn peers(&self) -> Result<Vec<NodeHandle>, NodeError> {
        let (reply, peers) = oneshot::channel();
        self.post(Message::Peers { reply })?;
        peers.await.map_err(|_| self.unreachable())
    }

    fn post(&self, message: Message) -> Result<(), NodeError> {
        self.inbox.send(message).map_err(|_| self.unreachable())
    }

    fn unreachable(&self) -> NodeError {
        NodeError::Unreachable(self.name.to_string())
    }

    /// Handle whose actor is already gone.
    #[cfg(test)]
    pub(crate) fn detached(name: &str, public_key: PublicKey) -> Self {
        let (inbox, _) = mpsc::unbounded_channel();
        Self {
            name: Arc::from(name),
            public_key,
            inbox,
        }
    }
}

/// Offer `payload` (an encoded chain) to every target in turn, waiting for
/// each verdict. Returns how many targets adopted it.
async fn broadcast(from: &str, targets: &[NodeHandle], payload: &[u8]) -> usize {
    let mut adopted = 0;
    for target in targets {
        match target.sync_chain(payload.to_vec()).await {
            Ok(()) => adopted += 1,
            Err(e) => debug!("{from}: {} kept its chain: {e}", target.name()),
        }
    }
    adopted
}

/// Operator side of a node: identity plus the user-level operations.
pub struct Node {
    handle: NodeHandle,
    keys: KeyPair,
    settings: NodeSettings,
    ledger: watch::Receiver<Arc<LedgerState>>,
    rng: Mutex<StdRng>,
}

impl Node {
    /// Generate an identity and start the node's actor on the current
    /// tokio runtime. All randomness of the node derives from `rng`.
    pub fn spawn(name: &str, settings: NodeSettings, mut rng: StdRng) -> Self {
        let keys = generate_keypair(&mut rng);
        let (inbox, messages) = mpsc::unbounded_channel();
        let handle = NodeHandle {
            name: Arc::from(name),
            public_key: keys.public.clone(),
            inbox,
        };
        let (slot, ledger) = watch::channel(Arc::new(LedgerState::default()));
        let actor = NodeActor::new(
            handle.clone(),
            settings,
            slot,
            messages,
            StdRng::seed_from_u64(rng.r#gen()),
        );
        tokio::spawn(actor.run());
        info!("{name}: client start - {}", keys.public);

        Self {
            handle,
            keys,
            settings,
            ledger,
            rng: Mutex::new(rng),
        }
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn public_key(&self) -> &PublicKey {
        self.handle.public_key()
    }

    pub fn settings(&self) -> NodeSettings {
        self.settings
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle.clone()
    }

    pub fn add_peer(&self, peer: &NodeHandle) {
        self.handle.add_peer(peer.clone());
    }

    pub async fn peers(&self) -> Result<Vec<NodeHandle>, NodeError> {
        self.handle.peers().await
    }

    /// Consistent snapshot of the node's chain and wallet.
    pub fn ledger(&self) -> Arc<LedgerState> {
        self.ledger.borrow().clone()
    }

    pub fn chain(&self) -> Chain {
        self.ledger().chain.clone()
    }

    pub fn wallet(&self) -> Wallet {
        self.ledger().wallet.clone()
    }

    /// Number of coins this node currently owns.
    pub fn wallet_size(&self) -> usize {
        self.ledger().wallet.balance_of(self.public_key())
    }

    /// Mine until one block (with no submitted coin) lands. Each round is
    /// bounded by the trial budget; rounds repeat without bound.
    pub async fn mine(&self) {
        info!("{}: trying to dig a new coin...", self.name());
        let mut rounds = 1u64;
        while !self.handle.receive_submission(None).await {
            rounds += 1;
        }
        debug!("{}: mined after {rounds} round(s)", self.name());
    }

    /// Transfer one owned coin to `receiver` and get it mined somewhere.
    pub async fn send(&self, receiver: &PublicKey) -> Result<(), NodeError> {
        let transfer = {
            let ledger = self.ledger();
            let Some(coin) = ledger.wallet.first_coin_of(self.public_key()) else {
                warn!("{}: no coins!", self.name());
                return Err(NodeError::NoFunds);
            };
            info!("{}: send coin {} to {receiver}", self.name(), coin.id);
            coin.transfer(&self.keys.private, receiver.clone())
        };
        self.submit_anywhere(&transfer).await
    }

    /// Launch one of the adversarial operations (modes 1..=6, see
    /// [`Attack`]). `receiver` is only used by the coin forgeries.
    pub async fn attack(&self, mode: u8, receiver: &PublicKey) -> Result<(), NodeError> {
        let attack = Attack::from_mode(mode)
            .inspect_err(|e| warn!("{}: {e}", self.name()))?;

        if attack.forges_coin() {
            let coin = {
                let ledger = self.ledger();
                let mut rng = self.rng.lock().expect("node rng poisoned");
                adversary::forge_coin(attack, &ledger.wallet, &self.keys, receiver, &mut *rng)
            }
            .inspect_err(|e| warn!("{}: {e}", self.name()))?;
            warn!("{}: HACK! send wrong coin ({attack}) to {receiver}", self.name());
            return self.submit_anywhere(&coin).await;
        }

        let chain = self.chain();
        let miner = self.public_key().clone();
        let pow = self.settings.pow;
        let mut rng = self.fork_rng();
        let forged = tokio::task::spawn_blocking(move || {
            adversary::forge_chain(attack, &chain, miner, &pow, &mut rng)
        })
        .await
        .map_err(|e| NodeError::Worker(e.to_string()))??;

        warn!("{}: HACK! broadcast wrong chain ({attack})", self.name());
        let targets = self.broadcast_targets().await?;
        let adopted = broadcast(self.name(), &targets, &codec::encode(&forged)).await;
        if adopted > 0 {
            warn!("{}: forged chain adopted by {adopted} node(s)", self.name());
        }
        Ok(())
    }

    /// Keep offering `coin` to uniformly random nodes (self included) until
    /// one of them mines it. No backoff.
    async fn submit_anywhere(&self, coin: &Coin) -> Result<(), NodeError> {
        let payload = codec::encode(coin);
        let targets = self.broadcast_targets().await?;
        loop {
            let target = {
                let mut rng = self.rng.lock().expect("node rng poisoned");
                targets.choose(&mut *rng).cloned()
            };
            let Some(target) = target else {
                return Err(NodeError::Unreachable(self.name().to_string()));
            };
            if target.receive_submission(Some(payload.clone())).await {
                debug!("{}: coin {} mined by {}", self.name(), coin.id, target.name());
                return Ok(());
            }
        }
    }

    /// This node followed by every known peer.
    async fn broadcast_targets(&self) -> Result<Vec<NodeHandle>, NodeError> {
        let peers = self.handle.peers().await?;
        Ok(PeerDirectory::from(peers).with_first(self.handle.clone()))
    }

    fn fork_rng(&self) -> StdRng {
        let mut rng = self.rng.lock().expect("node rng poisoned");
        StdRng::seed_from_u64(rng.r#gen())
    }
}
