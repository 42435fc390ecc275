mod error;
mod loader;
mod types;
mod validate;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{DEFAULT_DATABASE, LontodConfig};
pub use validate::server_config;
