use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info};

use super::models::{
    ActionResponse, AppState, AttackRequest, ErrorResponse, NodeSummary, NodesResponse,
    SendRequest, error_response,
};
use crate::node::Node;

async fn summarize(node: &Node) -> NodeSummary {
    let ledger = node.ledger();
    let peers = match node.peers().await {
        Ok(peers) => peers.iter().map(|p| p.name().to_string()).collect(),
        Err(e) => {
            debug!("{}: peer list unavailable: {e}", node.name());
            Vec::new()
        }
    };
    NodeSummary {
        name: node.name().to_string(),
        public_key: node.public_key().to_hex(),
        chain_length: ledger.chain.len(),
        wallet_size: node.wallet_size(),
        peers,
    }
}

/// List every node with its chain length and balance.
#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> impl Responder {
    let mut nodes = Vec::with_capacity(state.network.nodes().len());
    for node in state.network.nodes() {
        nodes.push(summarize(node).await);
    }
    HttpResponse::Ok().json(NodesResponse { nodes })
}

#[get("/nodes/{name}/")]
pub async fn get_node(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(summarize(node).await)
}

/// Mine one block on this node (retrying bounded attempts until one lands).
#[post("/nodes/{name}/mine/")]
pub async fn mine(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    node.mine().await;
    let resp = ActionResponse::of(node);
    info!("MINER - {} now at height {}", resp.node, resp.chain_length);
    HttpResponse::Ok().json(resp)
}

/// Transfer one coin to another node (by name) or to a hex public key.
#[post("/nodes/{name}/send/")]
pub async fn send(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SendRequest>,
) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    let Some(receiver) = state.network.resolve_key(&body.receiver) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("unknown receiver {:?}", body.receiver),
        });
    };
    match node.send(&receiver).await {
        Ok(()) => HttpResponse::Ok().json(ActionResponse::of(node)),
        Err(e) => error_response(&e),
    }
}

/// Launch an adversarial operation. Every honest node should reject it.
#[post("/nodes/{name}/attack/")]
pub async fn attack(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AttackRequest>,
) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    let receiver = match body.receiver.as_deref() {
        Some(r) => match state.network.resolve_key(r) {
            Some(key) => key,
            None => {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: format!("unknown receiver {r:?}"),
                });
            }
        },
        None => node.public_key().clone(),
    };
    match node.attack(body.mode, &receiver).await {
        Ok(()) => HttpResponse::Ok().json(ActionResponse::of(node)),
        Err(e) => error_response(&e),
    }
}
