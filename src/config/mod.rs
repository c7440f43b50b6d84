pub mod constants;
pub mod settings;

pub use settings::{load_rate_limit_config, ServerConfig};
