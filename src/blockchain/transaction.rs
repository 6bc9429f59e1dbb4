//! Transfer construction, signing and submission.
//!
//! # Protocol
//! 1. Resolve `from` from the account
//! 2. Query the pending nonce for `from`
//! 3. Query the suggested gas price
//! 4. Assemble the call with the request's fixed gas allowance
//! 5. Query the chain ID
//! 6. Sign with EIP-155 replay protection
//! 7. Submit and return the hash (no confirmation wait)
//!
//! Any failure aborts the whole transfer. Nonces are never cached, so only one
//! transfer per account may be in flight at a time.

use alloy::consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

use crate::blockchain::abi::AbiDescriptor;
use crate::blockchain::account::Account;
use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainId, ChainResult};

/// Gas allowance for a plain value transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Default gas allowance for a token `transfer` call.
pub const TOKEN_TRANSFER_GAS: u64 = 100_000;

/// What to transfer. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    /// Native currency, `amount` in wei.
    Native {
        to: Address,
        amount: U256,
        gas_limit: u64,
    },
    /// Token transfer through the contract's `transfer(address,uint256)`.
    Token {
        contract: Address,
        to: Address,
        amount: U256,
        gas_limit: u64,
    },
}

impl TransferRequest {
    pub fn native(to: Address, amount: U256) -> Self {
        Self::Native {
            to,
            amount,
            gas_limit: NATIVE_TRANSFER_GAS,
        }
    }

    pub fn token(contract: Address, to: Address, amount: U256) -> Self {
        Self::Token {
            contract,
            to,
            amount,
            gas_limit: TOKEN_TRANSFER_GAS,
        }
    }

    /// Replace the gas allowance; it is caller policy, not a protocol constant.
    pub fn with_gas_limit(self, gas_limit: u64) -> Self {
        match self {
            Self::Native { to, amount, .. } => Self::Native {
                to,
                amount,
                gas_limit,
            },
            Self::Token {
                contract,
                to,
                amount,
                ..
            } => Self::Token {
                contract,
                to,
                amount,
                gas_limit,
            },
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Native { gas_limit, .. } | Self::Token { gas_limit, .. } => *gas_limit,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Native { .. } => "native",
            Self::Token { .. } => "token",
        }
    }
}

/// A signed legacy transaction, addressable by its content hash.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    from: Address,
    signed: Signed<TxLegacy>,
    raw: Bytes,
}

impl SignedTransfer {
    /// Sign `tx` with `account`. Only reachable through [`TransferBuilder`] and
    /// tests, so the nonce always comes from the node.
    pub(crate) fn sign(account: &Account, mut tx: TxLegacy) -> ChainResult<Self> {
        let signature = account.sign_transaction(&mut tx)?;
        let signed = tx.into_signed(signature);
        let raw = Bytes::from(TxEnvelope::from(signed.clone()).encoded_2718());
        Ok(Self {
            from: account.address(),
            signed,
            raw,
        })
    }

    pub fn hash(&self) -> TxHash {
        *self.signed.hash()
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn to(&self) -> Option<Address> {
        self.signed.tx().to.to().copied()
    }

    pub fn value(&self) -> U256 {
        self.signed.tx().value
    }

    pub fn input(&self) -> &Bytes {
        &self.signed.tx().input
    }

    pub fn nonce(&self) -> u64 {
        self.signed.tx().nonce
    }

    pub fn gas_price(&self) -> u128 {
        self.signed.tx().gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.signed.tx().gas_limit
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.signed.tx().chain_id.map(ChainId)
    }

    /// Upper bound on the fee: gas limit × gas price.
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_limit()) * U256::from(self.gas_price())
    }

    /// RLP-encoded transaction as broadcast with `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Signer as a network reporting `chain_id` would recover it.
    ///
    /// Matches [`Self::from`] only on the chain the transaction was signed for.
    pub fn recover_signer(&self, chain_id: ChainId) -> ChainResult<Address> {
        let mut tx = self.signed.tx().clone();
        tx.chain_id = Some(chain_id.0);
        self.signed
            .signature()
            .recover_address_from_prehash(&tx.signature_hash())
            .map_err(|e| ChainError::Configuration(format!("Signature recovery failed: {}", e)))
    }
}

/// Builds, signs and submits transfers for one account over one connection.
pub struct TransferBuilder<'a> {
    client: &'a ChainClient,
    account: &'a Account,
    abi: &'a AbiDescriptor,
}

impl<'a> TransferBuilder<'a> {
    pub fn new(client: &'a ChainClient, account: &'a Account, abi: &'a AbiDescriptor) -> Self {
        Self {
            client,
            account,
            abi,
        }
    }

    /// Steps 1-6: query nonce, gas price and chain ID, then sign.
    pub async fn prepare(&self, request: &TransferRequest) -> ChainResult<SignedTransfer> {
        let from = self.account.address();
        let nonce = self.client.next_nonce(from).await?;
        let gas_price = self.client.suggested_gas_price().await?;

        let (to, value, input) = match request {
            TransferRequest::Native { to, amount, .. } => (*to, *amount, Bytes::new()),
            TransferRequest::Token {
                contract,
                to,
                amount,
                ..
            } => (*contract, U256::ZERO, self.abi.transfer_call(*to, *amount)?),
        };

        let chain_id = self.client.chain_identifier().await?;

        let tx = TxLegacy {
            chain_id: Some(chain_id.0),
            nonce,
            gas_price,
            gas_limit: request.gas_limit(),
            to: TxKind::Call(to),
            value,
            input,
        };

        let signed = SignedTransfer::sign(self.account, tx)?;

        tracing::debug!(
            kind = request.kind(),
            from = %from,
            nonce,
            gas_price,
            gas_limit = request.gas_limit(),
            chain_id = chain_id.0,
            tx_hash = %signed.hash(),
            "Transfer signed"
        );

        Ok(signed)
    }

    /// Steps 1-7: prepare, then submit. Returns the transaction hash.
    pub async fn send(&self, request: &TransferRequest) -> ChainResult<TxHash> {
        let signed = self.prepare(request).await?;
        self.client.submit(&signed).await
    }
}
