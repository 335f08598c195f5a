use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::blockchain::Chain;
use crate::error::NodeError;
use crate::network::Network;
use crate::node::Node;

/// Shared application state: the running simulated network.
pub struct AppState {
    pub network: Network,
}

impl AppState {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn node(&self, name: &str) -> Result<&Node, HttpResponse> {
        self.network.node(name).ok_or_else(|| {
            HttpResponse::NotFound().json(ErrorResponse {
                error: format!("unknown node {name:?}"),
            })
        })
    }

    /// Display name for a key if it belongs to one of our nodes.
    pub fn name_of(&self, key: &crate::crypto::PublicKey) -> Option<String> {
        self.network
            .nodes()
            .iter()
            .find(|n| n.public_key() == key)
            .map(|n| n.name().to_string())
    }
}

/* ---------- Node API Models ---------- */

#[derive(Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub public_key: String,
    pub chain_length: usize,
    pub wallet_size: usize,
    pub peers: Vec<String>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub nodes: Vec<NodeSummary>,
}

#[derive(Deserialize)]
pub struct SendRequest {
    pub receiver: String,
}

#[derive(Deserialize)]
pub struct AttackRequest {
    pub mode: u8,
    /// Only used by the coin forgeries (modes 1..=3).
    pub receiver: Option<String>,
}

#[derive(Serialize)]
pub struct ActionResponse {
    pub node: String,
    pub chain_length: usize,
    pub wallet_size: usize,
}

impl ActionResponse {
    pub fn of(node: &Node) -> Self {
        Self {
            node: node.name().to_string(),
            chain_length: node.ledger().chain.len(),
            wallet_size: node.wallet_size(),
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub node: &'a str,
    pub length: usize,
    pub chain: &'a Chain,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// 0 when valid, otherwise the rejection category (1..=5).
    pub code: u8,
    pub reason: Option<String>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct WalletEntry {
    pub owner: String,
    pub name: Option<String>,
    pub coins: Vec<String>,
}

#[derive(Serialize)]
pub struct WalletResponse {
    pub node: String,
    pub total_coins: usize,
    pub owners: Vec<WalletEntry>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map an operation failure to a status code. Precondition failures are
/// the caller's problem; a dead actor or worker is ours.
pub fn error_response(err: &NodeError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        NodeError::IllegalMode(_) => HttpResponse::BadRequest().json(body),
        NodeError::NoFunds | NodeError::NoEligibleCoin(_) => HttpResponse::Conflict().json(body),
        NodeError::ChainTooShort { .. } | NodeError::Rejected(_) | NodeError::Codec(_) => {
            HttpResponse::UnprocessableEntity().json(body)
        }
        NodeError::Unreachable(_) | NodeError::Worker(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}
