use actix_web::{HttpResponse, Responder, get, web};

use super::models::{
    AppState, ChainResponse, ValidateResponse, WalletEntry, WalletResponse,
};

/// Get a node's full chain.
#[get("/nodes/{name}/chain/")]
pub async fn get_chain(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    let ledger = node.ledger();
    HttpResponse::Ok().json(ChainResponse {
        node: node.name(),
        length: ledger.chain.len(),
        chain: &ledger.chain,
    })
}

/// Ownership view derived from a node's chain.
#[get("/nodes/{name}/wallet/")]
pub async fn get_wallet(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    let ledger = node.ledger();
    let owners = ledger
        .wallet
        .iter()
        .map(|(owner, coins)| WalletEntry {
            owner: owner.to_hex(),
            name: state.name_of(owner),
            coins: coins.iter().map(|c| c.id.to_string()).collect(),
        })
        .collect();
    HttpResponse::Ok().json(WalletResponse {
        node: node.name().to_string(),
        total_coins: ledger.wallet.total_coins(),
        owners,
    })
}

/// Re-run full validation over a node's current chain.
#[get("/nodes/{name}/validate/")]
pub async fn validate_chain(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let node = match state.node(&path) {
        Ok(node) => node,
        Err(resp) => return resp,
    };
    let ledger = node.ledger();
    let verdict = node.settings().pow.validate_chain(&ledger.chain);
    HttpResponse::Ok().json(ValidateResponse {
        valid: verdict.is_ok(),
        code: verdict.as_ref().map_or_else(|e| e.code(), |_| 0),
        reason: verdict.err().map(|e| e.to_string()),
        length: ledger.chain.len(),
    })
}
