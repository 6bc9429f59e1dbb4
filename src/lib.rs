//! EVM transfer demo library.
//!
//! Reads chain state from an Ethereum-compatible JSON-RPC node and builds,
//! signs and submits native and ERC-20 transfers.

pub mod blockchain;
pub mod config;
pub mod logging;
pub mod session;

pub use blockchain::{ChainClient, ChainError};
pub use config::DemoConfig;
pub use session::Session;
