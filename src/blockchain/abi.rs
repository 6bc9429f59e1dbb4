//! ABI descriptors for the token contract.
//!
//! The descriptor is a plain JSON ABI document, so a deployment can ship the
//! artifact produced by its compiler instead of the built-in ERC-20 subset.
//! Method lookup happens at call time: a descriptor that lacks a method only
//! fails when that method is actually used.

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes, U256};
use std::path::Path;

use crate::blockchain::types::{ChainError, ChainResult};

/// Minimal ERC-20 surface: `balanceOf` and `transfer`.
pub const ERC20_ABI_JSON: &str = r#"[
  {
    "type": "function",
    "name": "balanceOf",
    "stateMutability": "view",
    "inputs": [{ "name": "_owner", "type": "address" }],
    "outputs": [{ "name": "balance", "type": "uint256" }]
  },
  {
    "type": "function",
    "name": "transfer",
    "stateMutability": "nonpayable",
    "inputs": [
      { "name": "_to", "type": "address" },
      { "name": "_value", "type": "uint256" }
    ],
    "outputs": [{ "name": "success", "type": "bool" }]
  }
]"#;

pub const BALANCE_OF: &str = "balanceOf";
pub const TRANSFER: &str = "transfer";

/// A parsed contract ABI.
#[derive(Debug, Clone)]
pub struct AbiDescriptor {
    abi: JsonAbi,
}

impl AbiDescriptor {
    /// The built-in ERC-20 descriptor.
    pub fn erc20() -> ChainResult<Self> {
        Self::from_json(ERC20_ABI_JSON)
    }

    pub fn from_json(json: &str) -> ChainResult<Self> {
        let abi: JsonAbi = serde_json::from_str(json)
            .map_err(|e| ChainError::Configuration(format!("Invalid ABI descriptor: {}", e)))?;
        Ok(Self { abi })
    }

    pub fn from_file(path: &Path) -> ChainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChainError::Configuration(format!(
                "Cannot read ABI descriptor {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.abi.function(name).is_some_and(|f| !f.is_empty())
    }

    fn function(&self, name: &str) -> ChainResult<&Function> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| ChainError::contract_call(name, "method not present in ABI descriptor"))
    }

    /// Selector-prefixed call data for `name(args...)`.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> ChainResult<Bytes> {
        let function = self.function(name)?;
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| ChainError::contract_call(name, format!("cannot encode arguments: {}", e)))
    }

    pub fn decode_output(&self, name: &str, data: &[u8]) -> ChainResult<Vec<DynSolValue>> {
        let function = self.function(name)?;
        function
            .abi_decode_output(data)
            .map_err(|e| ChainError::contract_call(name, format!("cannot decode return data: {}", e)))
    }

    pub fn balance_of_call(&self, owner: Address) -> ChainResult<Bytes> {
        self.encode_call(BALANCE_OF, &[DynSolValue::Address(owner)])
    }

    pub fn transfer_call(&self, to: Address, amount: U256) -> ChainResult<Bytes> {
        self.encode_call(
            TRANSFER,
            &[DynSolValue::Address(to), DynSolValue::Uint(amount, 256)],
        )
    }

    /// Decode the single `uint256` returned by `balanceOf`.
    pub fn decode_balance(&self, data: &[u8]) -> ChainResult<U256> {
        let values = self.decode_output(BALANCE_OF, data)?;
        values
            .first()
            .and_then(DynSolValue::as_uint)
            .map(|(value, _)| value)
            .ok_or_else(|| ChainError::contract_call(BALANCE_OF, "return value is not an unsigned integer"))
    }
}
