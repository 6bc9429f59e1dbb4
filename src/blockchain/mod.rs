//! Ledger node integration.
//!
//! # Data Flow
//! ```text
//! Secret source (env var or key file)
//!     → account.rs (key derivation, signing)
//!     → client.rs (RPC connection with timeouts)
//!     → transaction.rs (build, sign, broadcast)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from a secret source, never literals
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - No retries: the first failure ends the operation

pub mod abi;
pub mod account;
pub mod client;
pub mod secrets;
pub mod transaction;
pub mod types;
pub mod units;

pub use abi::AbiDescriptor;
pub use account::Account;
pub use client::ChainClient;
pub use secrets::{EnvSecret, FileSecret, SecretSource};
pub use transaction::{SignedTransfer, TransferBuilder, TransferRequest};
pub use types::{ChainConfig, ChainError, ChainId, ChainResult};
pub use units::Balance;
