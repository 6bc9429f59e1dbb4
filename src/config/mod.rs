//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (validated, immutable)
//!     → secret_source() picks where the key is read from
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets stay out of the file; it only names their source

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::{AccountConfig, ChainConfig, DemoConfig, TokenConfig, TransferConfig};

use crate::blockchain::secrets::{EnvSecret, FileSecret, SecretSource};

impl AccountConfig {
    /// The configured key source; a key file wins over the environment variable.
    pub fn secret_source(&self) -> Box<dyn SecretSource> {
        match &self.private_key_file {
            Some(path) => Box::new(FileSecret::new(path)),
            None => Box::new(EnvSecret::new(&self.private_key_env)),
        }
    }
}
