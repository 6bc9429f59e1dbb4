//! Account derivation and transaction signing.
//!
//! # Security
//! - Key material comes from a [`SecretSource`], never from literals
//! - Keys are never logged or serialized

use alloy::consensus::TxLegacy;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Signature};
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::secrets::SecretSource;
use crate::blockchain::types::{ChainError, ChainResult};

/// An identity derived from a private key. Immutable once created.
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    /// Derive an account from a hex-encoded private key (with or without 0x prefix).
    pub fn from_private_key(private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ChainError::Configuration(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Account derived");

        Ok(Self { signer })
    }

    /// Derive an account from key material handed out by `source`.
    pub fn from_secret(source: &dyn SecretSource) -> ChainResult<Self> {
        tracing::debug!(source = %source.describe(), "Loading account key");
        let key = source.private_key()?;
        Self::from_private_key(&key)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign `tx` in place. A `chain_id` on the transaction selects EIP-155 signing.
    pub fn sign_transaction(&self, tx: &mut TxLegacy) -> ChainResult<Signature> {
        self.signer
            .sign_transaction_sync(tx)
            .map_err(|e| ChainError::Configuration(format!("Signing failed: {}", e)))
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish()
    }
}
