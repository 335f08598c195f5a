mod api;
mod blockchain;
mod codec;
mod config;
mod crypto;
mod error;
mod network;
mod node;
mod transaction;
mod wallet;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;

use api::AppState;
use config::Config;
use network::Network;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let (host, port) = (config.host.clone(), config.port);

    let network = Network::spawn(&config.node_names, config.node, config.seed);
    println!("⛓️ Starting coinchain API at http://{host}:{port}");

    let state = web::Data::new(AppState::new(network));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
