//! Chain-specific types and error definitions.

use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

use crate::config::ConfigError;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur while talking to a ledger node.
///
/// Every variant is fatal to the run; nothing in the crate retries.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Endpoint unreachable, handshake rejected, or the node is on the wrong chain.
    #[error("Connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    /// A read call failed or returned malformed data.
    #[error("Query `{op}` failed: {reason}")]
    Query { op: &'static str, reason: String },

    /// ABI descriptor mismatch or contract-side revert.
    #[error("Contract call `{method}` failed: {reason}")]
    ContractCall { method: String, reason: String },

    /// The node (or the local replay check) rejected a signed transaction.
    #[error("Transaction submission failed: {0}")]
    Submission(String),

    /// Malformed key material, address or ABI document.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ChainError {
    pub(crate) fn contract_call(method: &str, reason: impl Into<String>) -> Self {
        Self::ContractCall {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for ChainError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
