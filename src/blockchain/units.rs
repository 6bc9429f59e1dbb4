//! Smallest-unit balances and their decimal display.

use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;
use std::fmt;

use crate::blockchain::types::{ChainError, ChainResult};

/// Decimal exponent of the native currency (1 ether = 10^18 wei).
pub const NATIVE_DECIMALS: u8 = 18;

/// A non-negative quantity in the smallest unit of a currency or token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Balance {
    raw: U256,
    decimals: u8,
}

impl Balance {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Native-currency balance in wei.
    pub fn native(raw: U256) -> Self {
        Self::new(raw, NATIVE_DECIMALS)
    }

    /// Exact decimal rendering of `raw / 10^decimals`.
    pub fn scaled(&self) -> String {
        // Only exponents above 77 fail; config validation rejects those.
        format_units(self.raw, self.decimals).unwrap_or_else(|_| self.raw.to_string())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scaled())
    }
}

/// Parse a human amount such as `"0.001"` into smallest units.
pub fn parse_amount(text: &str, decimals: u8) -> ChainResult<U256> {
    let trimmed = text.trim();
    if trimmed.starts_with('-') {
        return Err(ChainError::Configuration(format!(
            "Amount '{}' must not be negative",
            text
        )));
    }
    parse_units(trimmed, decimals)
        .map(Into::into)
        .map_err(|e| ChainError::Configuration(format!("Invalid amount '{}': {}", text, e)))
}
