//! Sources of private key material.
//!
//! Keys are never compiled in. They are read at startup from the environment
//! or from a file, and the raw string is dropped as soon as the signer exists.

use std::path::PathBuf;

use crate::blockchain::types::{ChainError, ChainResult};

/// Default environment variable holding the account key.
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "DEMO_PRIVATE_KEY";

/// Something that can hand out a hex-encoded private key.
pub trait SecretSource {
    /// Where the key comes from, safe to log.
    fn describe(&self) -> String;

    fn private_key(&self) -> ChainResult<String>;
}

/// Key read from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvSecret {
    var: String,
}

impl EnvSecret {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl SecretSource for EnvSecret {
    fn describe(&self) -> String {
        format!("env:{}", self.var)
    }

    fn private_key(&self) -> ChainResult<String> {
        std::env::var(&self.var).map_err(|_| {
            ChainError::Configuration(format!("Environment variable {} not set", self.var))
        })
    }
}

/// Key read from a file, e.g. a mounted secret. Surrounding whitespace is ignored.
#[derive(Debug, Clone)]
pub struct FileSecret {
    path: PathBuf,
}

impl FileSecret {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretSource for FileSecret {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn private_key(&self) -> ChainResult<String> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ChainError::Configuration(format!(
                "Cannot read key file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(content.trim().to_string())
    }
}
