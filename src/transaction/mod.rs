pub mod model;
pub mod validation;

pub use model::{Coin, CoinId};
pub use validation::validate_versions;
