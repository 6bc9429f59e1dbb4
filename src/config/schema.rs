//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config file.
//! Key material is not part of the schema; only where to find it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::blockchain::secrets::DEFAULT_PRIVATE_KEY_ENV;
use crate::blockchain::transaction::{NATIVE_TRANSFER_GAS, TOKEN_TRANSFER_GAS};
use crate::blockchain::units::NATIVE_DECIMALS;

/// Root configuration for the demo.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Node endpoint settings.
    pub chain: ChainConfig,

    /// Where the signing key comes from.
    pub account: AccountConfig,

    /// Token contract settings.
    pub token: TokenConfig,

    /// Transfer target and gas policy.
    pub transfer: TransferConfig,
}

/// Node connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Refuse to connect to a node reporting a different chain ID.
    pub expected_chain_id: Option<u64>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.ankr.com/eth_sepolia".to_string(),
            rpc_timeout_secs: 10,
            expected_chain_id: None,
        }
    }
}

/// Secret source for the account key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Environment variable holding the hex private key.
    pub private_key_env: String,

    /// File holding the hex private key. Takes precedence over the variable.
    pub private_key_file: Option<PathBuf>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            private_key_env: DEFAULT_PRIVATE_KEY_ENV.to_string(),
            private_key_file: None,
        }
    }
}

/// Token contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Token contract address.
    pub contract_address: String,

    /// Decimal exponent used to display and parse token amounts.
    pub decimals: u8,

    /// JSON ABI file; the built-in ERC-20 descriptor is used when unset.
    pub abi_path: Option<PathBuf>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            // Sepolia test token
            contract_address: "0x55296f69f40Ea6d20E478533C15A6B08B654E758".to_string(),
            decimals: NATIVE_DECIMALS,
            abi_path: None,
        }
    }
}

/// Transfer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Default recipient when the command line does not name one.
    pub recipient: String,

    /// Gas allowance for native transfers.
    pub native_gas_limit: u64,

    /// Gas allowance for token transfers.
    pub token_gas_limit: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            recipient: "0x55296f69f40Ea6d20E478533C15A6B08B654E758".to_string(),
            native_gas_limit: NATIVE_TRANSFER_GAS,
            token_gas_limit: TOKEN_TRANSFER_GAS,
        }
    }
}
