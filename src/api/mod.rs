mod chain;
mod health;
pub mod models;
mod nodes;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(nodes::list_nodes)
            .service(nodes::get_node)
            .service(nodes::mine)
            .service(nodes::send)
            .service(nodes::attack)
            .service(chain::get_chain)
            .service(chain::get_wallet)
            .service(chain::validate_chain),
    );
}
