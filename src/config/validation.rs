//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, gas limits, decimals)
//! - Check that addresses and the endpoint URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::transaction::NATIVE_TRANSFER_GAS;
use crate::config::schema::DemoConfig;

/// Largest decimal exponent a 256-bit amount can be scaled by.
const MAX_DECIMALS: u8 = 77;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.chain.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("chain.rpc_url", e.to_string())),
    }

    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.rpc_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.account.private_key_file.is_none() && config.account.private_key_env.is_empty() {
        errors.push(ValidationError::new(
            "account",
            "either private_key_env or private_key_file must be set",
        ));
    }

    if let Err(e) = config.token.contract_address.parse::<Address>() {
        errors.push(ValidationError::new("token.contract_address", e.to_string()));
    }

    if config.token.decimals > MAX_DECIMALS {
        errors.push(ValidationError::new(
            "token.decimals",
            format!("must be at most {}", MAX_DECIMALS),
        ));
    }

    if let Err(e) = config.transfer.recipient.parse::<Address>() {
        errors.push(ValidationError::new("transfer.recipient", e.to_string()));
    }

    for (field, value) in [
        ("transfer.native_gas_limit", config.transfer.native_gas_limit),
        ("transfer.token_gas_limit", config.transfer.token_gas_limit),
    ] {
        if value < NATIVE_TRANSFER_GAS {
            errors.push(ValidationError::new(
                field,
                format!("must be at least {}", NATIVE_TRANSFER_GAS),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
