//! One run of the demo: a connection, an account and the token settings.
//!
//! Steps execute strictly in order and the first error ends the run; a failed
//! nonce query, for instance, means no transaction is ever built.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use std::fmt;

use crate::blockchain::abi::AbiDescriptor;
use crate::blockchain::account::Account;
use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::{TransferBuilder, TransferRequest};
use crate::blockchain::types::{ChainError, ChainId, ChainResult};
use crate::blockchain::units::{parse_amount, Balance, NATIVE_DECIMALS};
use crate::config::DemoConfig;

/// Snapshot of chain and account state.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub endpoint: String,
    pub chain_id: ChainId,
    pub block_height: u64,
    pub gas_price: u128,
    pub address: Address,
    pub native_balance: Balance,
    pub token_contract: Address,
    pub token_balance: Balance,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connected to {} (chain {})", self.endpoint, self.chain_id)?;
        writeln!(f, "Current block height: {}", self.block_height)?;
        writeln!(f, "Suggested gas price: {} wei", self.gas_price)?;
        writeln!(
            f,
            "Native balance of {}: {} ETH",
            self.address, self.native_balance
        )?;
        write!(
            f,
            "Token balance of {} at {}: {}",
            self.address, self.token_contract, self.token_balance
        )
    }
}

/// Result of a transfer command.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub kind: &'static str,
    pub hash: TxHash,
    pub nonce: u64,
    pub max_fee: U256,
    /// Present for dry runs, where nothing was broadcast.
    pub raw: Option<Bytes>,
}

impl TransferOutcome {
    pub fn submitted(&self) -> bool {
        self.raw.is_none()
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            None => write!(
                f,
                "{} transfer sent, hash: {} (nonce {}, max fee {} wei)",
                self.kind, self.hash, self.nonce, self.max_fee
            ),
            Some(raw) => write!(
                f,
                "{} transfer signed but not sent, hash: {} (nonce {}, max fee {} wei)\nraw: {}",
                self.kind, self.hash, self.nonce, self.max_fee, raw
            ),
        }
    }
}

/// Connected demo session.
#[derive(Debug)]
pub struct Session {
    client: ChainClient,
    account: Account,
    abi: AbiDescriptor,
    token_contract: Address,
    token_decimals: u8,
    recipient: Address,
    native_gas_limit: u64,
    token_gas_limit: u64,
}

impl Session {
    /// Resolve `config`, then connect.
    ///
    /// Configuration problems surface before any network traffic.
    pub async fn open(config: &DemoConfig, account: Account) -> ChainResult<Self> {
        let token_contract = parse_address("token.contract_address", &config.token.contract_address)?;
        let recipient = parse_address("transfer.recipient", &config.transfer.recipient)?;
        let abi = match &config.token.abi_path {
            Some(path) => AbiDescriptor::from_file(path)?,
            None => AbiDescriptor::erc20()?,
        };

        let client = ChainClient::connect(&config.chain).await?;

        Ok(Self {
            client,
            account,
            abi,
            token_contract,
            token_decimals: config.token.decimals,
            recipient,
            native_gas_limit: config.transfer.native_gas_limit,
            token_gas_limit: config.transfer.token_gas_limit,
        })
    }

    /// Block height, gas price, and both balances of the account.
    pub async fn status(&self) -> ChainResult<StatusReport> {
        let address = self.account.address();
        let block_height = self.client.current_block_height().await?;
        let gas_price = self.client.suggested_gas_price().await?;
        let native = self.client.native_balance(address).await?;
        let token = self
            .client
            .token_balance(self.token_contract, &self.abi, address)
            .await?;

        Ok(StatusReport {
            endpoint: self.client.endpoint().to_string(),
            chain_id: self.client.chain_id(),
            block_height,
            gas_price,
            address,
            native_balance: Balance::native(native),
            token_contract: self.token_contract,
            token_balance: Balance::new(token, self.token_decimals),
        })
    }

    /// Send `amount` (in ether, decimal) to `to` or the configured recipient.
    pub async fn transfer_native(
        &self,
        to: Option<Address>,
        amount: &str,
        dry_run: bool,
    ) -> ChainResult<TransferOutcome> {
        let amount = parse_amount(amount, NATIVE_DECIMALS)?;
        let request = TransferRequest::native(to.unwrap_or(self.recipient), amount)
            .with_gas_limit(self.native_gas_limit);
        self.execute(&request, dry_run).await
    }

    /// Send `amount` tokens (decimal, token units) to `to` or the configured recipient.
    pub async fn transfer_token(
        &self,
        to: Option<Address>,
        amount: &str,
        dry_run: bool,
    ) -> ChainResult<TransferOutcome> {
        let amount = parse_amount(amount, self.token_decimals)?;
        let request = TransferRequest::token(
            self.token_contract,
            to.unwrap_or(self.recipient),
            amount,
        )
        .with_gas_limit(self.token_gas_limit);
        self.execute(&request, dry_run).await
    }

    async fn execute(&self, request: &TransferRequest, dry_run: bool) -> ChainResult<TransferOutcome> {
        let builder = TransferBuilder::new(&self.client, &self.account, &self.abi);
        let signed = builder.prepare(request).await?;

        let (hash, raw) = if dry_run {
            tracing::info!(kind = request.kind(), tx_hash = %signed.hash(), "Dry run, not broadcasting");
            (signed.hash(), Some(signed.raw().clone()))
        } else {
            (self.client.submit(&signed).await?, None)
        };

        Ok(TransferOutcome {
            kind: request.kind(),
            hash,
            nonce: signed.nonce(),
            max_fee: signed.max_fee(),
            raw,
        })
    }
}

fn parse_address(field: &str, value: &str) -> ChainResult<Address> {
    value
        .parse()
        .map_err(|e| ChainError::Configuration(format!("{} '{}' is not an address: {}", field, value, e)))
}
